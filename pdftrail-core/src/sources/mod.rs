//! Page Sources
//!
//! The extraction pipeline never touches PDF object structure. All it needs
//! from a document is its page count and, per page, the raw text with
//! embedded newlines. A [`PageSource`] provides exactly that.
//!
//! ## Available Sources
//!
//! - `LopdfSource` - PDF files via `lopdf` (feature `lopdf-backend`)
//! - `PlainTextSource` - pre-extracted text, pages separated by form feeds
//! - `InMemorySource` - per-page results held in memory, including failures

pub mod plain_text;

#[cfg(feature = "lopdf-backend")]
pub mod lopdf_backend;

pub use plain_text::PlainTextSource;

#[cfg(feature = "lopdf-backend")]
pub use lopdf_backend::LopdfSource;

use crate::error::{ExtractionError, ExtractionResult};
use std::path::Path;

/// Upstream collaborator that yields raw page text.
///
/// Page numbers are 1-indexed. A failing `page_text` call is a per-page
/// problem: the orchestrator records it and moves on.
pub trait PageSource {
    /// Source identifier for logging and output envelopes
    fn name(&self) -> &str;

    fn page_count(&self) -> usize;

    fn page_text(&self, page_number: usize) -> ExtractionResult<String>;
}

pub(crate) fn page_out_of_range(page_number: usize, page_count: usize) -> ExtractionError {
    ExtractionError::PageExtraction {
        page: page_number,
        message: format!("page out of range (document has {page_count} pages)"),
    }
}

/// Open `path` with the PDF backend, or as form-feed separated text when
/// `plain_text` is set.
pub fn open_source(path: &Path, plain_text: bool) -> ExtractionResult<Box<dyn PageSource>> {
    if plain_text {
        return Ok(Box::new(PlainTextSource::from_file(path)?));
    }
    open_pdf(path)
}

#[cfg(feature = "lopdf-backend")]
fn open_pdf(path: &Path) -> ExtractionResult<Box<dyn PageSource>> {
    Ok(Box::new(LopdfSource::open(path)?))
}

#[cfg(not(feature = "lopdf-backend"))]
fn open_pdf(path: &Path) -> ExtractionResult<Box<dyn PageSource>> {
    Err(ExtractionError::Source {
        source_name: path.display().to_string(),
        message: "built without a PDF backend; enable the `lopdf-backend` feature or pass plain text"
            .to_string(),
    })
}

/// Pages held in memory. Each entry is either the page text or the error
/// message that extracting it should produce.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    name: String,
    pages: Vec<Result<String, String>>,
}

impl InMemorySource {
    pub fn new(name: impl Into<String>, pages: Vec<Result<String, String>>) -> Self {
        Self {
            name: name.into(),
            pages,
        }
    }

    pub fn from_pages<I, S>(name: impl Into<String>, pages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(name, pages.into_iter().map(|p| Ok(p.into())).collect())
    }

    /// Make extraction of `page_number` fail with `message`
    pub fn with_failure(mut self, page_number: usize, message: impl Into<String>) -> Self {
        if let Some(page) = page_number
            .checked_sub(1)
            .and_then(|index| self.pages.get_mut(index))
        {
            *page = Err(message.into());
        }
        self
    }
}

impl PageSource for InMemorySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_text(&self, page_number: usize) -> ExtractionResult<String> {
        let page = page_number
            .checked_sub(1)
            .and_then(|index| self.pages.get(index))
            .ok_or_else(|| page_out_of_range(page_number, self.pages.len()))?;
        page.clone().map_err(|message| ExtractionError::PageExtraction {
            page: page_number,
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_pages_are_one_indexed() {
        let source = InMemorySource::from_pages("mem", ["first", "second"]);
        assert_eq!(source.page_count(), 2);
        assert_eq!(source.page_text(1).unwrap(), "first");
        assert_eq!(source.page_text(2).unwrap(), "second");
        assert!(source.page_text(0).is_err());
        assert!(source.page_text(3).is_err());
    }

    #[test]
    fn test_injected_failure() {
        let source = InMemorySource::from_pages("mem", ["a", "b", "c"]).with_failure(2, "corrupt stream");
        match source.page_text(2) {
            Err(ExtractionError::PageExtraction { page, message }) => {
                assert_eq!(page, 2);
                assert_eq!(message, "corrupt stream");
            }
            other => panic!("expected page failure, got {other:?}"),
        }
        assert_eq!(source.page_text(3).unwrap(), "c");
    }

    #[test]
    fn test_open_missing_plain_text_is_source_error() {
        let err = open_source(Path::new("/nonexistent/paper.txt"), true)
            .err()
            .unwrap();
        assert!(matches!(err, ExtractionError::Source { .. }));
    }
}
