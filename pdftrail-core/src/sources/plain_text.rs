use super::{page_out_of_range, PageSource};
use crate::error::{ExtractionError, ExtractionResult};
use std::path::Path;

const FORM_FEED: char = '\x0C';

/// Pre-extracted text (e.g. `pdftotext` output) with one form feed between
/// pages. A single trailing form feed does not open an extra page.
#[derive(Debug, Clone)]
pub struct PlainTextSource {
    name: String,
    pages: Vec<String>,
}

impl PlainTextSource {
    pub fn from_string(name: impl Into<String>, text: &str) -> Self {
        let mut pages: Vec<String> = text.split(FORM_FEED).map(str::to_string).collect();
        if pages.len() > 1 && pages.last().is_some_and(|p| p.trim().is_empty()) {
            pages.pop();
        }
        if pages.len() == 1 && pages[0].is_empty() {
            pages.clear();
        }
        Self {
            name: name.into(),
            pages,
        }
    }

    pub fn from_file(path: &Path) -> ExtractionResult<Self> {
        let name = path.display().to_string();
        let text = std::fs::read_to_string(path).map_err(|e| ExtractionError::Source {
            source_name: name.clone(),
            message: e.to_string(),
        })?;
        Ok(Self::from_string(name, &text))
    }
}

impl PageSource for PlainTextSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_text(&self, page_number: usize) -> ExtractionResult<String> {
        page_number
            .checked_sub(1)
            .and_then(|index| self.pages.get(index))
            .cloned()
            .ok_or_else(|| page_out_of_range(page_number, self.pages.len()))
    }
}
