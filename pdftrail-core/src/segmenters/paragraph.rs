use super::{trim_span, SegmentCollector, Segmenter};
use crate::boundaries::PageBoundaries;
use crate::config::ParagraphConfig;
use crate::error::ExtractionResult;
use crate::tracker::DiscardTracker;
use crate::types::{DiscardType, SegmentKind, Segmentation};
use regex::Regex;
use std::sync::LazyLock;

// "1 Introduction", "2.3. Results", "A. Proofs", "IV. DISCUSSION"
static NUMBERED_HEADER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\d{1,2}(?:\.\d{1,2})*\.?|[A-Z]\.|[IVXLC]{1,6}\.)\s+\p{Lu}").unwrap()
});

const MAX_HEADER_WORDS: usize = 12;

/// Groups lines into paragraphs. A blank line ends the current paragraph; a
/// section-header line ends it too and opens the next one.
pub struct ParagraphSegmenter {
    min_length: usize,
    section_patterns: Vec<String>,
}

impl ParagraphSegmenter {
    pub fn new(config: &ParagraphConfig) -> Self {
        Self {
            min_length: config.min_length,
            section_patterns: config
                .section_patterns
                .iter()
                .map(|p| p.trim().to_lowercase())
                .collect(),
        }
    }

    pub fn is_section_header(&self, trimmed: &str) -> bool {
        let bare = trimmed.trim_end_matches(':').to_lowercase();
        if self.section_patterns.iter().any(|p| *p == bare) {
            return true;
        }
        NUMBERED_HEADER_REGEX.is_match(trimmed)
            && trimmed.split_whitespace().count() <= MAX_HEADER_WORDS
            && !trimmed.ends_with(['.', ',', ';', ':'])
    }

    fn flush(
        &self,
        collector: &mut SegmentCollector<'_>,
        chars: &[char],
        span: Option<(usize, usize)>,
        tracker: &mut DiscardTracker,
        short_reason: &str,
    ) -> ExtractionResult<()> {
        let Some((start, end)) = span.and_then(|(s, e)| trim_span(chars, s, e)) else {
            return Ok(());
        };
        if end - start < self.min_length {
            collector.discard(tracker, DiscardType::ShortLine, start, end, short_reason)
        } else {
            collector.emit(start, end);
            Ok(())
        }
    }
}

/// `(start, end)` character ranges of each line, terminators excluded
fn char_lines(chars: &[char]) -> Vec<(usize, usize)> {
    let mut lines = Vec::new();
    let mut start = 0;
    for (i, c) in chars.iter().enumerate() {
        if *c == '\n' {
            lines.push((start, i));
            start = i + 1;
        }
    }
    if start < chars.len() {
        lines.push((start, chars.len()));
    }
    lines
}

impl Segmenter for ParagraphSegmenter {
    fn kind(&self) -> SegmentKind {
        SegmentKind::Paragraph
    }

    fn segment(
        &self,
        text: &str,
        boundaries: &PageBoundaries,
        tracker: &mut DiscardTracker,
    ) -> ExtractionResult<Segmentation> {
        let chars: Vec<char> = text.chars().collect();
        let short_reason = format!("Paragraph < {} chars", self.min_length);
        let mut collector = SegmentCollector::new(&chars, boundaries);
        let mut current: Option<(usize, usize)> = None;

        for (line_start, line_end) in char_lines(&chars) {
            let line: String = chars[line_start..line_end].iter().collect();
            let trimmed = line.trim();

            if trimmed.is_empty() {
                self.flush(&mut collector, &chars, current.take(), tracker, &short_reason)?;
                continue;
            }

            if current.is_some() && self.is_section_header(trimmed) {
                self.flush(&mut collector, &chars, current.take(), tracker, &short_reason)?;
            }
            current = Some(match current {
                Some((start, _)) => (start, line_end),
                None => (line_start, line_end),
            });
        }
        self.flush(&mut collector, &chars, current.take(), tracker, &short_reason)?;

        let segmentation = collector.finish(tracker);
        tracing::debug!(paragraphs = segmentation.len(), "paragraph segmentation done");
        Ok(segmentation)
    }
}
