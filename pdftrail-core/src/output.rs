//! Output writers for cleaned text and segments.
//!
//! Plain text output follows the `[Sentence 3 - Page 2]` block layout;
//! JSON output wraps the payload in an envelope that identifies the source
//! and configuration by SHA-256 so runs can be compared.

use crate::config::CleaningConfig;
use crate::error::ExtractionError;
use crate::processor::ExtractedText;
use crate::tracker::{DiscardStatistics, DiscardTracker};
use crate::types::{Segment, SegmentKind, Segmentation};
use anyhow::{anyhow, Result};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use std::str::FromStr;

const RULE_WIDTH: usize = 80;
const TABLE_WIDTH: usize = 130;
const TABLE_TEXT_WIDTH: usize = 85;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = ExtractionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(ExtractionError::Config(format!(
                "unknown output format '{other}' (expected text or json)"
            ))),
        }
    }
}

/// Identifies what produced an output file
#[derive(Debug, Clone, Serialize)]
pub struct OutputMetadata {
    pub source: String,
    pub source_sha256: Option<String>,
    pub config_sha256: String,
    pub generated_at: String,
}

impl OutputMetadata {
    /// Fingerprint `source_path` (if readable) and `config`, stamped now
    pub fn collect(source_path: &Path, config: &CleaningConfig) -> Result<Self> {
        let source_sha256 = match fs::read(source_path) {
            Ok(bytes) => Some(sha256_hex(&bytes)),
            Err(e) => {
                tracing::warn!(path = %source_path.display(), error = %e, "cannot fingerprint source");
                None
            }
        };
        Ok(Self {
            source: source_path.display().to_string(),
            source_sha256,
            config_sha256: config_fingerprint(config)?,
            generated_at: chrono::Utc::now().to_rfc3339(),
        })
    }
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Hash of the serialized configuration
pub fn config_fingerprint(config: &CleaningConfig) -> Result<String> {
    let config_json = serde_json::to_string(config)
        .map_err(|e| anyhow!("Failed to serialize config for hashing: {}", e))?;
    Ok(sha256_hex(config_json.as_bytes()))
}

#[derive(Serialize)]
struct SegmentsEnvelope<'a> {
    #[serde(flatten)]
    metadata: &'a OutputMetadata,
    kind: SegmentKind,
    count: usize,
    statistics: DiscardStatistics,
    segments: Vec<Segment>,
}

#[derive(Serialize)]
struct TextEnvelope<'a> {
    #[serde(flatten)]
    metadata: &'a OutputMetadata,
    statistics: DiscardStatistics,
    page_boundaries: &'a [usize],
    text: &'a str,
}

/// Render segments as numbered blocks separated by an 80-column rule
pub fn render_segments(segmentation: &Segmentation, kind: SegmentKind) -> String {
    let mut out = String::new();
    let rule = "=".repeat(RULE_WIDTH);
    for (i, segment) in segmentation.iter().enumerate() {
        let pages = if segment.spans_pages() { "Pages" } else { "Page" };
        let _ = writeln!(
            out,
            "[{} {} - {} {}]",
            kind.label(),
            i + 1,
            pages,
            segment.page_label()
        );
        out.push_str(&segment.text);
        let _ = write!(out, "\n{rule}\n\n");
    }
    out
}

pub fn save_segments(
    segmentation: &Segmentation,
    kind: SegmentKind,
    path: impl AsRef<Path>,
    format: OutputFormat,
    metadata: &OutputMetadata,
    tracker: &DiscardTracker,
) -> Result<()> {
    let content = match format {
        OutputFormat::Text => render_segments(segmentation, kind),
        OutputFormat::Json => serde_json::to_string_pretty(&SegmentsEnvelope {
            metadata,
            kind,
            count: segmentation.len(),
            statistics: tracker.statistics(),
            segments: segmentation.iter().collect(),
        })?,
    };
    fs::write(path.as_ref(), content)?;
    tracing::info!(path = %path.as_ref().display(), count = segmentation.len(), "saved {}s", kind.label().to_lowercase());
    Ok(())
}

pub fn save_cleaned_text(
    extracted: &ExtractedText,
    path: impl AsRef<Path>,
    format: OutputFormat,
    metadata: &OutputMetadata,
    tracker: &DiscardTracker,
) -> Result<()> {
    let content = match format {
        OutputFormat::Text => extracted.text.clone(),
        OutputFormat::Json => serde_json::to_string_pretty(&TextEnvelope {
            metadata,
            statistics: tracker.statistics(),
            page_boundaries: extracted.boundaries.offsets(),
            text: &extracted.text,
        })?,
    };
    fs::write(path.as_ref(), content)?;
    tracing::info!(path = %path.as_ref().display(), "saved cleaned text");
    Ok(())
}

/// Fixed-width table: text preview, pages, length
pub fn render_table(segmentation: &Segmentation, kind: SegmentKind) -> String {
    let rule = "=".repeat(TABLE_WIDTH);
    let mut out = String::new();
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(
        out,
        "{:<width$} {:<15} {:<10}",
        kind.label(),
        "Pages",
        "Length",
        width = TABLE_TEXT_WIDTH
    );
    let _ = writeln!(out, "{rule}");
    for segment in segmentation.iter() {
        let preview: String = segment
            .text
            .replace('\n', " ")
            .chars()
            .take(TABLE_TEXT_WIDTH)
            .collect();
        let _ = writeln!(
            out,
            "{:<width$} {:<15} {:<10}",
            preview,
            segment.page_label(),
            segment.text.chars().count(),
            width = TABLE_TEXT_WIDTH
        );
    }
    let _ = writeln!(out, "{rule}");
    out
}
