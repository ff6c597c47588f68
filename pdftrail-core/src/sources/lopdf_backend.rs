//! PDF page source backed by `lopdf`

use super::{page_out_of_range, PageSource};
use crate::error::{ExtractionError, ExtractionResult};
use lopdf::Document;
use std::path::Path;

pub struct LopdfSource {
    name: String,
    document: Document,
    /// lopdf page numbers in document order
    page_numbers: Vec<u32>,
}

impl LopdfSource {
    /// Load a PDF. Encrypted files are tried with the empty user password.
    pub fn open(path: &Path) -> ExtractionResult<Self> {
        let name = path.display().to_string();
        let source_error = |message: String| ExtractionError::Source {
            source_name: name.clone(),
            message,
        };

        let mut document =
            Document::load(path).map_err(|e| source_error(format!("failed to load PDF: {e}")))?;
        if document.is_encrypted() {
            tracing::info!(path = %name, "PDF is encrypted, trying empty password");
            document
                .decrypt("")
                .map_err(|e| source_error(format!("failed to decrypt PDF: {e}")))?;
        }

        let page_numbers: Vec<u32> = document.get_pages().keys().copied().collect();
        tracing::debug!(path = %name, pages = page_numbers.len(), "opened PDF");

        Ok(Self {
            name,
            document,
            page_numbers,
        })
    }
}

impl PageSource for LopdfSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn page_count(&self) -> usize {
        self.page_numbers.len()
    }

    fn page_text(&self, page_number: usize) -> ExtractionResult<String> {
        let lopdf_page = page_number
            .checked_sub(1)
            .and_then(|index| self.page_numbers.get(index))
            .copied()
            .ok_or_else(|| page_out_of_range(page_number, self.page_numbers.len()))?;

        self.document
            .extract_text(&[lopdf_page])
            .map_err(|e| ExtractionError::PageExtraction {
                page: page_number,
                message: e.to_string(),
            })
    }
}
