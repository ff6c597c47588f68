//! Pipeline boundary tests: the properties that make the audit trail
//! trustworthy.
//!
//! Every test drives a small in-memory paper through the real pipeline:
//!
//! - Boundary 1 (extraction): cleaned text, page boundaries, discard log
//! - Boundary 2 (segmentation): page ranges of sentences and paragraphs
//! - Boundary 3 (reporting): text and JSON exports
//!
//! No PDF fixture is needed; page sources are built from strings.

use pdftrail_core::{
    offset_to_page, CleaningConfig, DiscardTracker, DiscardType, DocumentProcessor,
    ExtractedText, ExtractionError, InMemorySource, PlainTextSource, SegmentKind,
};

// ============================================================================
// Fixture helpers
// ============================================================================

const PAGE_ONE: &str = "arXiv:2401.00001v1 [cs.CL] 3 Jan 2024\nA Study of Discard Tracking\n\nAbstract\nWe study how text is cleaned. The method keeps an\n1\n";
const PAGE_TWO: &str = "audit trail of removed lines.\n1 Introduction\nPDF text is noisy.\n----------\n2\n";
const PAGE_FOUR: &str = "Results hold across papers.\nReferences\n[1] A. Author. Title. 2020.\n\n[2] B. Author. Other. 2021.\n4\n";

/// Four pages; page 3 cannot be extracted
fn sample_paper() -> InMemorySource {
    InMemorySource::from_pages("sample.pdf", [PAGE_ONE, PAGE_TWO, "", PAGE_FOUR])
        .with_failure(3, "corrupt content stream")
}

fn processor() -> DocumentProcessor {
    DocumentProcessor::new(CleaningConfig::default()).expect("default config is valid")
}

fn extract(source: &InMemorySource) -> (ExtractedText, DiscardTracker) {
    let mut tracker = DiscardTracker::new();
    let extracted = processor()
        .extract(source, &mut tracker)
        .expect("extraction succeeds");
    (extracted, tracker)
}

fn assert_conserved(tracker: &DiscardTracker) {
    assert_eq!(
        tracker.original_character_count(),
        tracker.final_character_count()
            + tracker.discarded_characters()
            + tracker.silent_characters(),
        "characters must be conserved"
    );
}

fn is_document_ordered<'a>(keys: impl Iterator<Item = (usize, usize)> + 'a) -> bool {
    let keys: Vec<(usize, usize)> = keys.collect();
    keys.windows(2).all(|w| w[0] <= w[1])
}

// ============================================================================
// Boundary 1: extraction and cleaning
// ============================================================================

mod extraction_boundary {
    use super::*;

    #[test]
    fn cleaned_text_keeps_only_body_lines() {
        let (extracted, _) = extract(&sample_paper());
        assert_eq!(
            extracted.text,
            "A Study of Discard Tracking\nAbstract\nWe study how text is cleaned. The method keeps an\naudit trail of removed lines.\n1 Introduction\nPDF text is noisy.\nResults hold across papers.\n"
        );
    }

    #[test]
    fn discard_counts_by_type() {
        let (_, tracker) = extract(&sample_paper());
        let stats = tracker.statistics();

        assert_eq!(stats.count(DiscardType::ArxivMetadata), 1);
        assert_eq!(stats.count(DiscardType::PageNumber), 3);
        assert_eq!(stats.count(DiscardType::SeparatorLine), 1);
        assert_eq!(stats.count(DiscardType::Other), 1);
        assert_eq!(stats.count(DiscardType::ReferencesSection), 1);
        assert_eq!(stats.count(DiscardType::BibliographyEntry), 2);
        assert_eq!(stats.total_discarded, 9);
    }

    #[test]
    fn conservation_law_holds_exactly() {
        let (extracted, tracker) = extract(&sample_paper());
        assert_conserved(&tracker);
        assert_eq!(
            tracker.final_character_count(),
            extracted.text.chars().count()
        );
    }

    #[test]
    fn boundaries_are_monotonic_with_one_entry_per_page_plus_one() {
        let (extracted, _) = extract(&sample_paper());
        let offsets = extracted.boundaries.offsets();

        assert_eq!(offsets.len(), 4 + 1);
        assert!(offsets.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(offsets[0], 0);
        assert_eq!(*offsets.last().unwrap(), extracted.text.chars().count());
    }

    #[test]
    fn page_starts_map_back_to_their_pages() {
        let source = InMemorySource::from_pages(
            "dense.pdf",
            [
                "First page body text.\n",
                "Second page body text.\n",
                "Third page body text.\n",
            ],
        );
        let (extracted, _) = extract(&source);
        let offsets = extracted.boundaries.offsets();
        for page in 0..extracted.page_count() {
            assert_eq!(offset_to_page(offsets[page], offsets), page);
        }
    }

    #[test]
    fn failed_page_is_recorded_and_contributes_nothing() {
        let (extracted, tracker) = extract(&sample_paper());
        let offsets = extracted.boundaries.offsets();
        assert_eq!(offsets[2], offsets[3], "page 3 kept no characters");

        let other: Vec<_> = tracker.items_of(DiscardType::Other).collect();
        assert_eq!(other.len(), 1);
        assert_eq!(other[0].page_number, 3);
        assert_eq!(other[0].line_number, 0);
        assert!(other[0].content.is_empty());
        assert!(other[0].reason.contains("Page 3"));
        assert!(other[0].reason.contains("corrupt content stream"));
    }

    #[test]
    fn references_carry_their_source_page_and_line() {
        let (extracted, tracker) = extract(&sample_paper());
        let heading: Vec<_> = tracker.items_of(DiscardType::ReferencesSection).collect();
        assert_eq!((heading[0].page_number, heading[0].line_number), (4, 2));

        let entries: Vec<(usize, usize)> = tracker
            .items_of(DiscardType::BibliographyEntry)
            .map(|i| (i.page_number, i.line_number))
            .collect();
        assert_eq!(entries, vec![(4, 3), (4, 5)]);

        assert_eq!(extracted.line_origins.len(), 7);
        assert_eq!(extracted.line_origins.last().map(|o| o.page), Some(4));
    }

    #[test]
    fn discard_log_follows_document_order() {
        let (_, tracker) = extract(&sample_paper());
        assert!(is_document_ordered(
            tracker.items().iter().map(|i| (i.page_number, i.line_number))
        ));

        // the folio under the bibliography comes after the entries above it
        let tail: Vec<DiscardType> = tracker
            .items()
            .iter()
            .rev()
            .take(4)
            .map(|i| i.discard_type)
            .collect();
        assert_eq!(
            tail,
            vec![
                DiscardType::PageNumber,
                DiscardType::BibliographyEntry,
                DiscardType::BibliographyEntry,
                DiscardType::ReferencesSection,
            ]
        );
    }

    #[test]
    fn page_number_wins_over_short_line() {
        let (_, tracker) = extract(&sample_paper());
        assert_eq!(tracker.count(DiscardType::ShortLine), 0);
        assert!(tracker
            .items_of(DiscardType::PageNumber)
            .all(|i| i.content.len() == 1));
    }

    #[test]
    fn empty_document_is_an_error() {
        let source = InMemorySource::from_pages("empty.pdf", Vec::<String>::new());
        let mut tracker = DiscardTracker::new();
        let err = processor().extract(&source, &mut tracker).unwrap_err();
        assert!(matches!(err, ExtractionError::EmptyDocument(_)));
        assert!(err.is_fatal());
    }

    #[test]
    fn document_without_recoverable_pages_is_a_source_error() {
        let source = InMemorySource::from_pages("broken.pdf", ["", ""])
            .with_failure(1, "bad xref")
            .with_failure(2, "bad xref");
        let mut tracker = DiscardTracker::new();
        let err = processor().extract(&source, &mut tracker).unwrap_err();

        match &err {
            ExtractionError::Source {
                source_name,
                message,
            } => {
                assert_eq!(source_name, "broken.pdf");
                assert!(message.contains("no recoverable pages"));
                assert!(message.contains("bad xref"));
            }
            other => panic!("expected a source error, got {other:?}"),
        }
        assert!(err.is_fatal());
        assert!(tracker.items().is_empty());
        assert_eq!(tracker.original_character_count(), 0);
    }

    #[test]
    fn one_readable_page_is_enough() {
        let source = InMemorySource::from_pages("partial.pdf", ["", "Only this page survives.\n"])
            .with_failure(1, "bad xref");
        let (extracted, tracker) = extract(&source);
        assert_eq!(extracted.text, "Only this page survives.\n");
        assert_eq!(extracted.boundaries.offsets(), &[0, 0, 25]);
        assert_eq!(tracker.count(DiscardType::Other), 1);
        assert_conserved(&tracker);
    }

    #[test]
    fn plain_text_pages_run_through_the_same_pipeline() {
        let text = format!("{PAGE_ONE}\x0C{PAGE_TWO}\x0C");
        let source = PlainTextSource::from_string("paper.txt", &text);
        let mut tracker = DiscardTracker::new();
        let extracted = processor().extract(&source, &mut tracker).unwrap();

        assert_eq!(extracted.page_count(), 2);
        assert!(extracted.text.ends_with("PDF text is noisy.\n"));
        assert_conserved(&tracker);
    }
}

// ============================================================================
// Boundary 2: segmentation
// ============================================================================

mod segmentation_boundary {
    use super::*;

    #[test]
    fn sentence_broken_across_pages_reports_both_pages() {
        let mut tracker = DiscardTracker::new();
        let (_, sentences) = processor()
            .process_segments(&sample_paper(), SegmentKind::Sentence, &mut tracker)
            .unwrap();

        let spanning: Vec<_> = sentences.iter().filter(|s| s.spans_pages()).collect();
        assert!(!spanning.is_empty());
        let first = spanning[0].clone();
        assert!(first.text.starts_with("The method keeps an\naudit trail"));
        assert_eq!((first.start_page, first.end_page), (1, 2));
    }

    #[test]
    fn segment_sequences_stay_aligned() {
        for kind in [SegmentKind::Sentence, SegmentKind::Paragraph] {
            let mut tracker = DiscardTracker::new();
            let (_, segmentation) = processor()
                .process_segments(&sample_paper(), kind, &mut tracker)
                .unwrap();
            assert_eq!(segmentation.segments.len(), segmentation.start_pages.len());
            assert_eq!(segmentation.segments.len(), segmentation.end_pages.len());
            assert!(segmentation
                .start_pages
                .iter()
                .zip(&segmentation.end_pages)
                .all(|(start, end)| start <= end));
        }
    }

    #[test]
    fn conservation_survives_segmentation() {
        for kind in [SegmentKind::Sentence, SegmentKind::Paragraph] {
            let mut tracker = DiscardTracker::new();
            let (_, segmentation) = processor()
                .process_segments(&sample_paper(), kind, &mut tracker)
                .unwrap();
            assert_conserved(&tracker);
            assert_eq!(tracker.final_character_count(), segmentation.char_count());
        }
    }

    #[test]
    fn segment_discards_do_not_inflate_line_statistics() {
        let (_, extraction_only) = extract(&sample_paper());
        let extraction_stats = extraction_only.statistics();

        for kind in [SegmentKind::Sentence, SegmentKind::Paragraph] {
            let mut tracker = DiscardTracker::new();
            processor()
                .process_segments(&sample_paper(), kind, &mut tracker)
                .unwrap();
            let stats = tracker.statistics();
            assert_eq!(stats.lines_processed, extraction_stats.lines_processed);
            assert_eq!(stats.lines_discarded, extraction_stats.lines_discarded);
            assert!(stats.line_discard_percent <= 100.0);
        }
        // eight line discards; the failed page is not a line
        assert_eq!(extraction_stats.lines_discarded, 8);
        assert_eq!(extraction_stats.total_discarded, 9);
    }

    #[test]
    fn paragraphs_split_at_section_headers() {
        let mut tracker = DiscardTracker::new();
        let (_, paragraphs) = processor()
            .process_segments(&sample_paper(), SegmentKind::Paragraph, &mut tracker)
            .unwrap();

        assert!(paragraphs
            .segments
            .iter()
            .any(|p| p.starts_with("1 Introduction\nPDF text is noisy.")));
        assert!(paragraphs
            .segments
            .iter()
            .any(|p| p.starts_with("Abstract\nWe study how text is cleaned.")));
    }
}

// ============================================================================
// Boundary 3: reporting
// ============================================================================

mod reporting_boundary {
    use super::*;

    #[test]
    fn exported_report_has_counts_then_statistics() {
        let (_, tracker) = extract(&sample_paper());
        let path = std::env::temp_dir().join("pdftrail_pipeline_report.txt");
        tracker.export(&path).unwrap();
        let report = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();

        let types_at = report.find("ITEMS DISCARDED BY TYPE:").unwrap();
        let stats_at = report.find("STATISTICS:").unwrap();
        let detail_at = report.find("DETAILED DISCARD LIST").unwrap();
        assert!(types_at < stats_at && stats_at < detail_at);
        assert!(report.contains("  Page Number                        3 items"));
        assert!(report.contains("  TOTAL DISCARDED                    9 items"));
        assert!(report.contains("Page 3, Line 0"));
    }

    #[test]
    fn json_log_contains_every_item() {
        let (_, tracker) = extract(&sample_paper());
        let path = std::env::temp_dir().join("pdftrail_pipeline_log.json");
        tracker.export_json(&path).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(value["items"].as_array().map(Vec::len), Some(9));
        assert_eq!(value["statistics"]["total_discarded"], 9);
        assert_eq!(value["statistics"]["page_number"], 3);
    }

    #[test]
    fn report_is_independent_of_insertion_order() {
        let mut forward = DiscardTracker::new();
        let mut backward = DiscardTracker::new();
        forward.set_original_character_count(100).unwrap();
        backward.set_original_character_count(100).unwrap();

        let items = [
            (DiscardType::ShortLine, "ab", 1, 2),
            (DiscardType::PageNumber, "3", 1, 5),
            (DiscardType::Other, "", 2, 0),
        ];
        for (t, content, page, line) in items {
            forward.record(t, content, page, line, "r").unwrap();
        }
        for (t, content, page, line) in items.iter().rev() {
            backward.record(*t, *content, *page, *line, "r").unwrap();
        }
        assert_eq!(forward.render_report(false), backward.render_report(false));
    }
}
