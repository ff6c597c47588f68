// pdftrail Core Library
//
// Extracts text from PDFs page by page, strips layout noise and the
// bibliography, and keeps an audit trail of every discarded piece.
// Cleaned text can then be split into sentences or paragraphs tagged with
// their source pages.

pub mod boundaries;
pub mod config;
pub mod error;
pub mod lines;
pub mod output;
pub mod processor;
pub mod rules;
pub mod segmenters;
pub mod sources;
pub mod tracker;
pub mod types;

// Re-export main types and functions for easy use
pub use boundaries::{offset_to_page, PageBoundaries};
pub use config::CleaningConfig;
pub use error::{ExtractionError, ExtractionResult};
pub use processor::{extract_and_clean, DocumentProcessor, ExtractedText, PipelineStages};
pub use rules::{PageTextCleaner, ReferenceSectionRemover};
pub use segmenters::{ParagraphSegmenter, SentenceSegmenter, Segmenter};
pub use sources::{open_source, InMemorySource, PageSource, PlainTextSource};
pub use tracker::{DiscardStatistics, DiscardTracker};
pub use types::*;

// Re-export backends for direct use
#[cfg(feature = "lopdf-backend")]
pub use sources::LopdfSource;
