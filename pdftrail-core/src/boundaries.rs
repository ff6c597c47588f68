use serde::{Deserialize, Serialize};

/// Character offsets at which each page's content starts in the cleaned text.
///
/// Holds `page_count + 1` non-decreasing entries: entry `p` is where page
/// index `p` begins and the last entry is the total cleaned length. A page
/// that kept no characters repeats the previous offset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageBoundaries {
    offsets: Vec<usize>,
}

impl Default for PageBoundaries {
    fn default() -> Self {
        Self::new()
    }
}

impl PageBoundaries {
    /// Empty index: zero pages, one sentinel at offset 0
    pub fn new() -> Self {
        Self { offsets: vec![0] }
    }

    /// Build from raw offsets. Returns `None` unless the sequence is
    /// non-empty, starts at 0 and is non-decreasing.
    pub fn from_offsets(offsets: Vec<usize>) -> Option<Self> {
        if offsets.first() != Some(&0) {
            return None;
        }
        if offsets.windows(2).any(|w| w[0] > w[1]) {
            return None;
        }
        Some(Self { offsets })
    }

    /// Close the current page at `end_offset`, which becomes the start of the
    /// next page and the running total length.
    pub fn push_page_end(&mut self, end_offset: usize) {
        let last = self.total_len();
        debug_assert!(end_offset >= last, "page boundaries must not decrease");
        self.offsets.push(end_offset.max(last));
    }

    /// Shrink the total length after trailing text was cut (reference
    /// removal). Offsets past the new end are clamped to it.
    pub fn truncate_to(&mut self, new_len: usize) {
        for offset in self.offsets.iter_mut() {
            if *offset > new_len {
                *offset = new_len;
            }
        }
    }

    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    pub fn page_count(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    pub fn total_len(&self) -> usize {
        self.offsets.last().copied().unwrap_or(0)
    }

    /// 0-based page index for `offset`. See [`offset_to_page`].
    pub fn offset_to_page(&self, offset: usize) -> usize {
        offset_to_page(offset, &self.offsets)
    }

    /// 1-based page number for `offset`, the numbering used in discards and
    /// segments.
    pub fn page_number(&self, offset: usize) -> usize {
        self.offset_to_page(offset) + 1
    }
}

/// Greatest page index `p` with `boundaries[p] <= offset`.
///
/// An offset equal to a boundary belongs to the page that boundary starts.
/// Offsets at or past the final entry clamp to the last page. With fewer than
/// two entries (no pages) the answer is 0.
pub fn offset_to_page(offset: usize, boundaries: &[usize]) -> usize {
    let page_count = boundaries.len().saturating_sub(1);
    if page_count == 0 {
        return 0;
    }
    let at_or_before = boundaries.partition_point(|&b| b <= offset);
    at_or_before.saturating_sub(1).min(page_count - 1)
}
