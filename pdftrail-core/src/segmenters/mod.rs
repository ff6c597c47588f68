//! Segmenters
//!
//! Turn the cleaned text into sentences or paragraphs, each tagged with the
//! pages its first and last characters came from. Fragments too small to be
//! useful are recorded in the tracker instead of being emitted. Whitespace
//! between segments is counted as silent, and the tracker's final character
//! count is replaced by the characters actually emitted.

pub mod paragraph;
pub mod sentence;

pub use paragraph::ParagraphSegmenter;
pub use sentence::SentenceSegmenter;

use crate::boundaries::PageBoundaries;
use crate::error::ExtractionResult;
use crate::tracker::DiscardTracker;
use crate::types::{DiscardType, Segment, SegmentKind, Segmentation};

pub trait Segmenter {
    fn kind(&self) -> SegmentKind;

    fn segment(
        &self,
        text: &str,
        boundaries: &PageBoundaries,
        tracker: &mut DiscardTracker,
    ) -> ExtractionResult<Segmentation>;
}

/// Shrink `[start, end)` to exclude surrounding whitespace. `None` when
/// nothing but whitespace is left.
pub(crate) fn trim_span(chars: &[char], start: usize, end: usize) -> Option<(usize, usize)> {
    let mut start = start;
    let mut end = end.min(chars.len());
    while start < end && chars[start].is_whitespace() {
        start += 1;
    }
    while end > start && chars[end - 1].is_whitespace() {
        end -= 1;
    }
    (start < end).then_some((start, end))
}

/// Shared bookkeeping for one segmentation pass over a character buffer.
pub(crate) struct SegmentCollector<'a> {
    chars: &'a [char],
    boundaries: &'a PageBoundaries,
    output: Segmentation,
    emitted_chars: usize,
    discarded_chars: usize,
}

impl<'a> SegmentCollector<'a> {
    pub(crate) fn new(chars: &'a [char], boundaries: &'a PageBoundaries) -> Self {
        Self {
            chars,
            boundaries,
            output: Segmentation::default(),
            emitted_chars: 0,
            discarded_chars: 0,
        }
    }

    pub(crate) fn text(&self, start: usize, end: usize) -> String {
        self.chars[start..end].iter().collect()
    }

    pub(crate) fn emit(&mut self, start: usize, end: usize) {
        let segment = Segment {
            text: self.text(start, end),
            start_page: self.boundaries.page_number(start),
            end_page: self.boundaries.page_number(end - 1),
        };
        self.emitted_chars += end - start;
        self.output.push(segment);
    }

    pub(crate) fn discard(
        &mut self,
        tracker: &mut DiscardTracker,
        discard_type: DiscardType,
        start: usize,
        end: usize,
        reason: &str,
    ) -> ExtractionResult<()> {
        let page = self.boundaries.page_number(start);
        tracker.record(discard_type, self.text(start, end), page, 0, reason)?;
        self.discarded_chars += end - start;
        Ok(())
    }

    pub(crate) fn finish(self, tracker: &mut DiscardTracker) -> Segmentation {
        let gaps = self
            .chars
            .len()
            .saturating_sub(self.emitted_chars + self.discarded_chars);
        tracker.record_silent(0, gaps);
        tracker.set_final_character_count(self.emitted_chars);
        self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_span() {
        let chars: Vec<char> = "  ab c \n".chars().collect();
        assert_eq!(trim_span(&chars, 0, chars.len()), Some((2, 6)));
        assert_eq!(trim_span(&chars, 6, 8), None);
        assert_eq!(trim_span(&chars, 0, 0), None);
    }

    #[test]
    fn test_collector_accounts_for_gaps() {
        let chars: Vec<char> = "One here.  Tiny.\n".chars().collect();
        let boundaries = PageBoundaries::from_offsets(vec![0, chars.len()]).unwrap();
        let mut tracker = DiscardTracker::new();
        tracker.set_original_character_count(chars.len()).unwrap();

        let mut collector = SegmentCollector::new(&chars, &boundaries);
        collector.emit(0, 9);
        collector
            .discard(&mut tracker, DiscardType::ShortLine, 11, 16, "short")
            .unwrap();
        let segmentation = collector.finish(&mut tracker);

        assert_eq!(segmentation.segments, vec!["One here."]);
        assert_eq!(tracker.final_character_count(), 9);
        assert_eq!(tracker.silent_characters(), 3);
        assert_eq!(tracker.items()[0].content, "Tiny.");
    }
}
