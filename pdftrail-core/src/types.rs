use serde::{Deserialize, Serialize};
use std::fmt;

// ===== DISCARD TYPES =====
// The set is closed: report layout and JSON keys depend on it. Variant
// declaration order IS the canonical display order (derived Ord).

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscardType {
    PageNumber,
    HeaderFooter,
    ArxivMetadata,
    DateFooter,
    SeparatorLine,
    ShortLine,
    ReferencesSection,
    BibliographyEntry,
    Other,
}

impl DiscardType {
    /// All variants in canonical report order
    pub const ALL: [DiscardType; 9] = [
        DiscardType::PageNumber,
        DiscardType::HeaderFooter,
        DiscardType::ArxivMetadata,
        DiscardType::DateFooter,
        DiscardType::SeparatorLine,
        DiscardType::ShortLine,
        DiscardType::ReferencesSection,
        DiscardType::BibliographyEntry,
        DiscardType::Other,
    ];

    /// Stable machine key (used in JSON statistics)
    pub fn key(&self) -> &'static str {
        match self {
            DiscardType::PageNumber => "page_number",
            DiscardType::HeaderFooter => "header_footer",
            DiscardType::ArxivMetadata => "arxiv_metadata",
            DiscardType::DateFooter => "date_footer",
            DiscardType::SeparatorLine => "separator_line",
            DiscardType::ShortLine => "short_line",
            DiscardType::ReferencesSection => "references_section",
            DiscardType::BibliographyEntry => "bibliography_entry",
            DiscardType::Other => "other",
        }
    }

    /// Title-case name for human-readable reports
    pub fn display_name(&self) -> &'static str {
        match self {
            DiscardType::PageNumber => "Page Number",
            DiscardType::HeaderFooter => "Header Footer",
            DiscardType::ArxivMetadata => "Arxiv Metadata",
            DiscardType::DateFooter => "Date Footer",
            DiscardType::SeparatorLine => "Separator Line",
            DiscardType::ShortLine => "Short Line",
            DiscardType::ReferencesSection => "References Section",
            DiscardType::BibliographyEntry => "Bibliography Entry",
            DiscardType::Other => "Other",
        }
    }
}

impl fmt::Display for DiscardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key().to_uppercase())
    }
}

/// One unit of content removed from the text stream.
///
/// `page_number` is 1-indexed. `line_number` is the 1-indexed line within the
/// raw page text, or 0 when the discard is not tied to a single line
/// (whole-page failures, segmenter fragments).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscardedItem {
    pub discard_type: DiscardType,
    pub content: String,
    pub page_number: usize,
    pub line_number: usize,
    pub reason: String,
}

impl DiscardedItem {
    pub fn char_count(&self) -> usize {
        self.content.chars().count()
    }
}

impl fmt::Display for DiscardedItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let preview: String = self.content.chars().take(50).collect();
        write!(
            f,
            "[{}] Page {}, Line {}: {}",
            self.discard_type.key(),
            self.page_number,
            self.line_number,
            preview
        )
    }
}

/// Where a line of cleaned text came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineOrigin {
    /// 1-indexed source page
    pub page: usize,
    /// 1-indexed line within the raw page text
    pub line: usize,
}

// ===== SEGMENTS =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    Sentence,
    Paragraph,
}

impl SegmentKind {
    pub fn label(&self) -> &'static str {
        match self {
            SegmentKind::Sentence => "Sentence",
            SegmentKind::Paragraph => "Paragraph",
        }
    }
}

/// A sentence or paragraph with the 1-indexed pages its first and last
/// characters came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub text: String,
    pub start_page: usize,
    pub end_page: usize,
}

impl Segment {
    pub fn spans_pages(&self) -> bool {
        self.start_page != self.end_page
    }

    /// "3" or "3-4"
    pub fn page_label(&self) -> String {
        if self.spans_pages() {
            format!("{}-{}", self.start_page, self.end_page)
        } else {
            self.start_page.to_string()
        }
    }
}

/// Segmenter output as three aligned sequences.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segmentation {
    pub segments: Vec<String>,
    pub start_pages: Vec<usize>,
    pub end_pages: Vec<usize>,
}

impl Segmentation {
    pub fn push(&mut self, segment: Segment) {
        self.segments.push(segment.text);
        self.start_pages.push(segment.start_page);
        self.end_pages.push(segment.end_page);
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Zip the aligned sequences back into owned segments
    pub fn iter(&self) -> impl Iterator<Item = Segment> + '_ {
        self.segments
            .iter()
            .zip(self.start_pages.iter().zip(self.end_pages.iter()))
            .map(|(text, (start, end))| Segment {
                text: text.clone(),
                start_page: *start,
                end_page: *end,
            })
    }

    /// Total characters across all segments
    pub fn char_count(&self) -> usize {
        self.segments.iter().map(|s| s.chars().count()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_order_matches_declaration() {
        let mut shuffled = vec![
            DiscardType::Other,
            DiscardType::ShortLine,
            DiscardType::PageNumber,
            DiscardType::BibliographyEntry,
        ];
        shuffled.sort();
        assert_eq!(
            shuffled,
            vec![
                DiscardType::PageNumber,
                DiscardType::ShortLine,
                DiscardType::BibliographyEntry,
                DiscardType::Other,
            ]
        );
    }

    #[test]
    fn test_discard_type_serializes_as_snake_case() {
        let json = serde_json::to_string(&DiscardType::ArxivMetadata).unwrap();
        assert_eq!(json, "\"arxiv_metadata\"");
        assert_eq!(DiscardType::ArxivMetadata.to_string(), "ARXIV_METADATA");
    }

    #[test]
    fn test_segmentation_stays_aligned() {
        let mut seg = Segmentation::default();
        seg.push(Segment {
            text: "First sentence here.".to_string(),
            start_page: 1,
            end_page: 1,
        });
        seg.push(Segment {
            text: "Second one spans.".to_string(),
            start_page: 1,
            end_page: 2,
        });

        assert_eq!(seg.len(), 2);
        assert_eq!(seg.start_pages, vec![1, 1]);
        assert_eq!(seg.end_pages, vec![1, 2]);
        let labels: Vec<String> = seg.iter().map(|s| s.page_label()).collect();
        assert_eq!(labels, vec!["1", "1-2"]);
    }
}
