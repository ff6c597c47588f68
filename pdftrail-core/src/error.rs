use thiserror::Error;

/// Errors raised by the extraction pipeline.
///
/// Only `Source` and `EmptyDocument` abort a document. `PageExtraction` is
/// produced by page sources and absorbed by the orchestrator into the discard
/// log; `PreconditionViolation` signals a programming error against the
/// tracker contract.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("cannot open source '{source_name}': {message}")]
    Source {
        source_name: String,
        message: String,
    },

    #[error("source '{0}' contains no pages")]
    EmptyDocument(String),

    #[error("text extraction failed for page {page}: {message}")]
    PageExtraction { page: usize, message: String },

    #[error("precondition violated: {0}")]
    PreconditionViolation(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ExtractionError {
    /// True for errors that must abort the whole document.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ExtractionError::PageExtraction { .. })
    }
}

pub type ExtractionResult<T> = std::result::Result<T, ExtractionError>;
