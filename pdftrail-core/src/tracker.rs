//! Discard Tracker
//!
//! Session-scoped audit log of everything the pipeline removes from the text
//! stream. Every stage receives the tracker by `&mut` and reports each
//! removed line or fragment through [`DiscardTracker::record`]; characters
//! that carry no meaning on their own (blank lines, line terminators of
//! dropped lines, whitespace between segments) are tallied separately with
//! [`DiscardTracker::record_silent`].
//!
//! With both tallies the tracker satisfies the conservation law
//!
//! ```text
//! original_characters == final_characters + Σ chars(item.content) + silent_characters
//! ```
//!
//! Statistics and reports are pure functions of the recorded state. Report
//! layout is independent of insertion order: types are listed in the
//! canonical [`DiscardType::ALL`] order.

use crate::error::{ExtractionError, ExtractionResult};
use crate::types::{DiscardType, DiscardedItem};
use anyhow::Result;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

/// Items listed per type in the detailed report
const DETAIL_ITEMS_PER_TYPE: usize = 10;
/// Content preview width in the detailed report
const DETAIL_PREVIEW_CHARS: usize = 70;

#[derive(Debug, Clone, Default)]
pub struct DiscardTracker {
    items: Vec<DiscardedItem>,
    lines_processed: usize,
    original_character_count: Option<usize>,
    final_character_count: usize,
    blank_lines: usize,
    silent_characters: usize,
}

/// Aggregate view over a tracker, serializable as a flat mapping.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscardStatistics {
    #[serde(flatten)]
    pub counts: BTreeMap<DiscardType, usize>,
    pub total_discarded: usize,
    pub lines_processed: usize,
    pub lines_discarded: usize,
    pub line_discard_percent: f64,
    pub original_characters: usize,
    pub final_characters: usize,
    pub characters_removed: usize,
    pub character_reduction_percent: f64,
    pub blank_lines: usize,
    pub silent_characters: usize,
}

impl DiscardStatistics {
    pub fn count(&self, discard_type: DiscardType) -> usize {
        self.counts.get(&discard_type).copied().unwrap_or(0)
    }
}

#[derive(Serialize)]
struct DiscardLogExport<'a> {
    generated_at: String,
    statistics: DiscardStatistics,
    items: &'a [DiscardedItem],
}

impl DiscardTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the pre-cleaning character count. Must happen exactly once, before
    /// the first discard is recorded.
    pub fn set_original_character_count(&mut self, count: usize) -> ExtractionResult<()> {
        if let Some(existing) = self.original_character_count {
            return Err(ExtractionError::PreconditionViolation(format!(
                "original character count already set to {existing}"
            )));
        }
        self.original_character_count = Some(count);
        Ok(())
    }

    pub fn original_character_count(&self) -> usize {
        self.original_character_count.unwrap_or(0)
    }

    pub fn set_final_character_count(&mut self, count: usize) {
        self.final_character_count = count;
    }

    pub fn final_character_count(&self) -> usize {
        self.final_character_count
    }

    pub fn add_lines_processed(&mut self, lines: usize) {
        self.lines_processed += lines;
    }

    pub fn lines_processed(&self) -> usize {
        self.lines_processed
    }

    /// Account for characters removed without a log entry: blank lines and
    /// structural whitespace (line terminators, gaps between segments).
    pub fn record_silent(&mut self, blank_lines: usize, characters: usize) {
        self.blank_lines += blank_lines;
        self.silent_characters += characters;
    }

    pub fn blank_lines(&self) -> usize {
        self.blank_lines
    }

    pub fn silent_characters(&self) -> usize {
        self.silent_characters
    }

    /// Append one discarded item.
    ///
    /// Fails fast when called before the original character count is known or
    /// with page 0 (pages are 1-indexed).
    pub fn record(
        &mut self,
        discard_type: DiscardType,
        content: impl Into<String>,
        page_number: usize,
        line_number: usize,
        reason: impl Into<String>,
    ) -> ExtractionResult<()> {
        if self.original_character_count.is_none() {
            return Err(ExtractionError::PreconditionViolation(
                "discard recorded before original character count was set".to_string(),
            ));
        }
        if page_number == 0 {
            return Err(ExtractionError::PreconditionViolation(format!(
                "page numbers are 1-indexed, got 0 for {discard_type} discard"
            )));
        }

        let item = DiscardedItem {
            discard_type,
            content: content.into(),
            page_number,
            line_number,
            reason: reason.into(),
        };
        tracing::trace!(item = %item, "discarded");
        self.items.push(item);
        Ok(())
    }

    /// Items in insertion order
    pub fn items(&self) -> &[DiscardedItem] {
        &self.items
    }

    pub fn items_of(&self, discard_type: DiscardType) -> impl Iterator<Item = &DiscardedItem> {
        self.items
            .iter()
            .filter(move |item| item.discard_type == discard_type)
    }

    pub fn count(&self, discard_type: DiscardType) -> usize {
        self.items_of(discard_type).count()
    }

    pub fn total_discarded(&self) -> usize {
        self.items.len()
    }

    /// Items stably sorted by (page, line). Insertion order groups items by
    /// pipeline stage; this view interleaves them in reading order.
    pub fn items_in_document_order(&self) -> Vec<&DiscardedItem> {
        let mut items: Vec<&DiscardedItem> = self.items.iter().collect();
        items.sort_by_key(|item| (item.page_number, item.line_number));
        items
    }

    /// Move everything `staged` recorded into this tracker. Items are
    /// appended stably sorted by (page, line), so discards produced by
    /// separate passes over the same pages land in reading order.
    pub fn append_in_document_order(&mut self, staged: DiscardTracker) -> ExtractionResult<()> {
        if self.original_character_count.is_none() {
            return Err(ExtractionError::PreconditionViolation(
                "discards appended before original character count was set".to_string(),
            ));
        }
        let mut items = staged.items;
        items.sort_by_key(|item| (item.page_number, item.line_number));
        self.items.extend(items);
        self.lines_processed += staged.lines_processed;
        self.blank_lines += staged.blank_lines;
        self.silent_characters += staged.silent_characters;
        Ok(())
    }

    /// Characters across all logged item contents
    pub fn discarded_characters(&self) -> usize {
        self.items.iter().map(DiscardedItem::char_count).sum()
    }

    pub fn statistics(&self) -> DiscardStatistics {
        let mut counts: BTreeMap<DiscardType, usize> =
            DiscardType::ALL.iter().map(|t| (*t, 0)).collect();
        for item in &self.items {
            *counts.entry(item.discard_type).or_insert(0) += 1;
        }

        let original = self.original_character_count();
        let total_discarded = self.items.len();
        // page failures and segment fragments carry line 0 and are not lines
        let lines_discarded = self.items.iter().filter(|item| item.line_number > 0).count();
        let characters_removed = original.saturating_sub(self.final_character_count);

        DiscardStatistics {
            counts,
            total_discarded,
            lines_processed: self.lines_processed,
            lines_discarded,
            line_discard_percent: percent(lines_discarded, self.lines_processed),
            original_characters: original,
            final_characters: self.final_character_count,
            characters_removed,
            character_reduction_percent: percent(characters_removed, original),
            blank_lines: self.blank_lines,
            silent_characters: self.silent_characters,
        }
    }

    /// Render the text report. `detailed` appends the per-type item listing.
    pub fn render_report(&self, detailed: bool) -> String {
        let stats = self.statistics();
        let mut out = String::new();

        // Writing into a String cannot fail
        let _ = writeln!(out, "ITEMS DISCARDED BY TYPE:");
        for discard_type in DiscardType::ALL {
            let _ = writeln!(
                out,
                "  {:<30} {:>5} items",
                discard_type.display_name(),
                stats.count(discard_type)
            );
        }
        let _ = writeln!(out, "  {:<30} {:>5} items", "TOTAL DISCARDED", stats.total_discarded);
        let _ = writeln!(out);

        let _ = writeln!(out, "STATISTICS:");
        let _ = writeln!(out, "  Lines processed:            {}", stats.lines_processed);
        let _ = writeln!(
            out,
            "  Lines discarded:            {} ({:.1}%)",
            stats.lines_discarded, stats.line_discard_percent
        );
        let _ = writeln!(out, "  Original characters:        {}", stats.original_characters);
        let _ = writeln!(out, "  Final characters:           {}", stats.final_characters);
        let _ = writeln!(
            out,
            "  Characters removed:         {} ({:.1}%)",
            stats.characters_removed, stats.character_reduction_percent
        );

        if detailed {
            out.push('\n');
            out.push_str(&self.render_detail());
        }

        out
    }

    fn render_detail(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "DETAILED DISCARD LIST");
        let _ = writeln!(out, "{}", "=".repeat(80));

        for discard_type in DiscardType::ALL {
            let items: Vec<&DiscardedItem> = self.items_of(discard_type).collect();
            if items.is_empty() {
                continue;
            }

            let _ = writeln!(out);
            let _ = writeln!(out, "{discard_type}");
            let _ = writeln!(out, "{}", "-".repeat(80));
            for item in items.iter().take(DETAIL_ITEMS_PER_TYPE) {
                let preview: String = item.content.chars().take(DETAIL_PREVIEW_CHARS).collect();
                let _ = writeln!(
                    out,
                    "  Page {}, Line {}: {}",
                    item.page_number, item.line_number, preview
                );
                if !item.reason.is_empty() {
                    let _ = writeln!(out, "    Reason: {}", item.reason);
                }
            }
            if items.len() > DETAIL_ITEMS_PER_TYPE {
                let _ = writeln!(
                    out,
                    "  ... and {} more items",
                    items.len() - DETAIL_ITEMS_PER_TYPE
                );
            }
        }

        out
    }

    /// Write the detailed text report to `path`
    pub fn export(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path.as_ref(), self.render_report(true))?;
        tracing::info!(path = %path.as_ref().display(), items = self.items.len(), "wrote discard log");
        Ok(())
    }

    /// Write statistics plus every item as JSON to `path`
    pub fn export_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let export = DiscardLogExport {
            generated_at: chrono::Utc::now().to_rfc3339(),
            statistics: self.statistics(),
            items: &self.items,
        };
        let json = serde_json::to_string_pretty(&export)?;
        fs::write(path.as_ref(), json)?;
        tracing::info!(path = %path.as_ref().display(), "wrote JSON discard log");
        Ok(())
    }

    /// Print the summary report to stdout
    pub fn print_summary(&self) {
        println!("{}", "=".repeat(80));
        println!("DISCARD TRACKER SUMMARY");
        println!("{}", "=".repeat(80));
        print!("{}", self.render_report(false));
        println!("{}", "=".repeat(80));
    }
}

/// Percentage rounded to one decimal; zero denominators yield 0.0
fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    let value = part as f64 / whole as f64 * 100.0;
    (value * 10.0).round() / 10.0
}
