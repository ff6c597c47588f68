use crate::boundaries::PageBoundaries;
use crate::config::CleaningConfig;
use crate::error::{ExtractionError, ExtractionResult};
use crate::lines::{char_len, line_unit_len, split_lines};
use crate::rules::{CleanedPage, PageTextCleaner, ReferenceSectionRemover};
use crate::segmenters::{ParagraphSegmenter, SentenceSegmenter, Segmenter};
use crate::sources::PageSource;
use crate::tracker::DiscardTracker;
use crate::types::{DiscardType, LineOrigin, SegmentKind, Segmentation};
use std::time::{Duration, Instant};

/// Cleaned document text plus the index needed to map offsets back to pages.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ExtractedText {
    /// Retained lines, each followed by '\n', references removed
    pub text: String,
    pub boundaries: PageBoundaries,
    /// Source page and line of every line in `text`
    pub line_origins: Vec<LineOrigin>,
}

impl ExtractedText {
    pub fn page_count(&self) -> usize {
        self.boundaries.page_count()
    }

    pub fn char_len(&self) -> usize {
        self.boundaries.total_len()
    }
}

/// Captured intermediate outputs from each pipeline stage
/// Used by tests and `--save-stages` to inspect each stage boundary
#[derive(Debug, Clone, serde::Serialize)]
pub struct PipelineStages {
    /// Raw text per page; `None` where extraction failed
    pub raw_pages: Vec<Option<String>>,
    /// Each page's contribution to the cleaned text
    pub cleaned_pages: Vec<String>,
    /// Concatenated cleaned text before reference removal
    pub cleaned_text: String,
    pub extracted: ExtractedText,
}

/// Times pipeline stages when enabled. Each stage runs inside a
/// `pipeline_step` tracing span and the totals are logged once per document.
pub struct StepProfiler {
    enabled: bool,
    timings: Vec<(&'static str, Duration)>,
}

impl StepProfiler {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            timings: Vec::new(),
        }
    }

    pub fn time_step<F, R>(&mut self, step: &'static str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        if !self.enabled {
            return f();
        }

        let span = tracing::info_span!("pipeline_step", step);
        let _entered = span.enter();
        let start = Instant::now();
        let result = f();
        self.timings.push((step, start.elapsed()));
        result
    }

    pub fn timings(&self) -> &[(&'static str, Duration)] {
        &self.timings
    }

    pub fn total(&self) -> Duration {
        self.timings.iter().map(|(_, elapsed)| *elapsed).sum()
    }

    /// Emit one `info` event per step plus the total
    pub fn log_summary(&self) {
        if !self.enabled || self.timings.is_empty() {
            return;
        }

        let total = self.total();
        for (step, elapsed) in &self.timings {
            let share = if total.is_zero() {
                0.0
            } else {
                elapsed.as_secs_f64() / total.as_secs_f64() * 100.0
            };
            tracing::info!(
                step = *step,
                elapsed_ms = elapsed.as_millis() as u64,
                share_percent = (share * 10.0).round() / 10.0,
                "step timing"
            );
        }
        tracing::info!(total_ms = total.as_millis() as u64, "pipeline timing");
    }
}

/// Drive one document through page cleaning and reference removal.
///
/// Fails when the source has no pages, when no page yields text, or when a
/// page source reports a fatal error. A page whose text cannot be extracted is recorded as an `OTHER`
/// discard and contributes nothing; its boundary repeats the previous offset.
pub fn extract_and_clean(
    source: &dyn PageSource,
    cleaner: &PageTextCleaner,
    remover: &ReferenceSectionRemover,
    tracker: &mut DiscardTracker,
) -> ExtractionResult<ExtractedText> {
    let mut profiler = StepProfiler::new(false);
    run_pipeline(source, cleaner, remover, tracker, &mut profiler).map(|stages| stages.extracted)
}

fn run_pipeline(
    source: &dyn PageSource,
    cleaner: &PageTextCleaner,
    remover: &ReferenceSectionRemover,
    tracker: &mut DiscardTracker,
    profiler: &mut StepProfiler,
) -> ExtractionResult<PipelineStages> {
    let page_count = source.page_count();
    if page_count == 0 {
        return Err(ExtractionError::EmptyDocument(source.name().to_string()));
    }
    tracing::info!(source = source.name(), pages = page_count, "extracting document");

    // Stage 1: raw text for every page, so the original size is known before
    // the first discard is recorded
    let mut raw_pages = profiler.time_step("Page Extraction", || {
        (1..=page_count)
            .map(|page| source.page_text(page))
            .collect::<Vec<_>>()
    });
    if let Some(fatal) = raw_pages
        .iter()
        .position(|page| matches!(page, Err(err) if err.is_fatal()))
    {
        if let Err(err) = raw_pages.swap_remove(fatal) {
            return Err(err);
        }
    }
    if raw_pages.iter().all(Result::is_err) {
        let failures: Vec<String> = raw_pages
            .iter()
            .filter_map(|page| page.as_ref().err())
            .map(ToString::to_string)
            .collect();
        return Err(ExtractionError::Source {
            source_name: source.name().to_string(),
            message: format!("no recoverable pages ({})", failures.join("; ")),
        });
    }
    let original: usize = raw_pages
        .iter()
        .filter_map(|page| page.as_ref().ok())
        .map(|text| line_unit_len(text))
        .sum();
    tracker.set_original_character_count(original)?;

    // Cleaning and reference removal both walk the pages front to back; their
    // discards are staged and merged so the log reads in (page, line) order.
    let mut staged = DiscardTracker::new();
    staged.set_original_character_count(original)?;

    // Stage 2: per-page cleaning, in page order
    let (cleaned_pages, mut boundaries, mut line_origins) =
        profiler.time_step("Page Cleaning", || {
            clean_pages(&raw_pages, cleaner, &mut staged)
        })?;
    let cleaned_text: String = cleaned_pages.iter().map(CleanedPage::text).collect();

    // Stage 3: document-level reference removal
    let text = profiler.time_step("Reference Removal", || {
        remover.remove_with_origins(&cleaned_text, &line_origins, &mut staged)
    })?;
    tracker.append_in_document_order(staged)?;
    line_origins.truncate(split_lines(&text).len());
    let final_len = char_len(&text);
    boundaries.truncate_to(final_len);
    tracker.set_final_character_count(final_len);

    tracing::info!(
        original_characters = original,
        final_characters = final_len,
        discarded = tracker.total_discarded(),
        "extraction complete"
    );

    Ok(PipelineStages {
        raw_pages: raw_pages.into_iter().map(Result::ok).collect(),
        cleaned_pages: cleaned_pages.iter().map(CleanedPage::text).collect(),
        cleaned_text,
        extracted: ExtractedText {
            text,
            boundaries,
            line_origins,
        },
    })
}

fn clean_pages(
    raw_pages: &[ExtractionResult<String>],
    cleaner: &PageTextCleaner,
    tracker: &mut DiscardTracker,
) -> ExtractionResult<(Vec<CleanedPage>, PageBoundaries, Vec<LineOrigin>)> {
    let mut pages = Vec::with_capacity(raw_pages.len());
    let mut boundaries = PageBoundaries::new();
    let mut origins = Vec::new();
    let mut offset = 0;

    for (index, raw) in raw_pages.iter().enumerate() {
        let page_number = index + 1;
        let page = match raw {
            Ok(raw_text) => cleaner.clean_page_text(raw_text, page_number, tracker)?,
            Err(err) => {
                tracing::warn!(page = page_number, error = %err, "skipping page");
                tracker.record(
                    DiscardType::Other,
                    "",
                    page_number,
                    0,
                    format!("Page {page_number} skipped: {err}"),
                )?;
                CleanedPage {
                    page_number,
                    lines: Vec::new(),
                }
            }
        };

        origins.extend(page.lines.iter().map(|line| LineOrigin {
            page: page_number,
            line: line.line_number,
        }));
        offset += page.char_count();
        boundaries.push_page_end(offset);
        pages.push(page);
    }

    Ok((pages, boundaries, origins))
}

/// Config-driven front end for the whole pipeline: cleaning, reference
/// removal and optional segmentation.
pub struct DocumentProcessor {
    config: CleaningConfig,
    cleaner: PageTextCleaner,
    remover: ReferenceSectionRemover,
    sentences: SentenceSegmenter,
    paragraphs: ParagraphSegmenter,
    profile: bool,
}

impl DocumentProcessor {
    pub fn new(config: CleaningConfig) -> ExtractionResult<Self> {
        let cleaner = PageTextCleaner::from_config(&config)?;
        tracing::debug!(rules = ?cleaner.rule_names(), "line rule pipeline");
        Ok(Self {
            remover: ReferenceSectionRemover::from_config(&config),
            sentences: SentenceSegmenter::new(&config.sentence),
            paragraphs: ParagraphSegmenter::new(&config.paragraph),
            cleaner,
            config,
            profile: false,
        })
    }

    pub fn with_default_config() -> ExtractionResult<Self> {
        Self::new(CleaningConfig::default())
    }

    /// Log step timings after each run
    pub fn with_profiling(mut self, enabled: bool) -> Self {
        self.profile = enabled;
        self
    }

    pub fn config(&self) -> &CleaningConfig {
        &self.config
    }

    pub fn cleaner(&self) -> &PageTextCleaner {
        &self.cleaner
    }

    pub fn extract(
        &self,
        source: &dyn PageSource,
        tracker: &mut DiscardTracker,
    ) -> ExtractionResult<ExtractedText> {
        self.process_source_capture_stages(source, tracker)
            .map(|stages| stages.extracted)
    }

    /// Run extraction and keep every intermediate stage
    pub fn process_source_capture_stages(
        &self,
        source: &dyn PageSource,
        tracker: &mut DiscardTracker,
    ) -> ExtractionResult<PipelineStages> {
        let mut profiler = StepProfiler::new(self.profile);
        let stages = run_pipeline(source, &self.cleaner, &self.remover, tracker, &mut profiler)?;
        profiler.log_summary();
        Ok(stages)
    }

    pub fn segmenter(&self, kind: SegmentKind) -> &dyn Segmenter {
        match kind {
            SegmentKind::Sentence => &self.sentences,
            SegmentKind::Paragraph => &self.paragraphs,
        }
    }

    /// Segment already extracted text
    pub fn segment(
        &self,
        extracted: &ExtractedText,
        kind: SegmentKind,
        tracker: &mut DiscardTracker,
    ) -> ExtractionResult<Segmentation> {
        let segmenter = self.segmenter(kind);
        let segmentation = segmenter.segment(&extracted.text, &extracted.boundaries, tracker)?;
        tracing::info!(
            kind = segmenter.kind().label(),
            segments = segmentation.len(),
            discarded = tracker.total_discarded(),
            "segmentation complete"
        );
        Ok(segmentation)
    }

    /// Extract and segment in one go
    pub fn process_segments(
        &self,
        source: &dyn PageSource,
        kind: SegmentKind,
        tracker: &mut DiscardTracker,
    ) -> ExtractionResult<(ExtractedText, Segmentation)> {
        let extracted = self.extract(source, tracker)?;
        let segmentation = self.segment(&extracted, kind, tracker)?;
        Ok((extracted, segmentation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::InMemorySource;

    fn processor() -> DocumentProcessor {
        DocumentProcessor::with_default_config().unwrap()
    }

    #[test]
    fn test_stages_are_captured() {
        let source = InMemorySource::from_pages(
            "paper",
            ["Title of the paper\n1\n", "Body text continues.\nReferences\n[1] Cited.\n"],
        );
        let mut tracker = DiscardTracker::new();
        let stages = processor()
            .process_source_capture_stages(&source, &mut tracker)
            .unwrap();

        assert_eq!(stages.raw_pages.len(), 2);
        assert_eq!(stages.cleaned_pages[0], "Title of the paper\n");
        assert!(stages.cleaned_text.contains("References"));
        assert_eq!(
            stages.extracted.text,
            "Title of the paper\nBody text continues.\n"
        );
        assert_eq!(stages.extracted.boundaries.offsets(), &[0, 19, 40]);
        assert_eq!(
            stages.extracted.line_origins,
            vec![LineOrigin { page: 1, line: 1 }, LineOrigin { page: 2, line: 1 }]
        );
    }

    #[test]
    fn test_profiler_records_steps_when_enabled() {
        let mut profiler = StepProfiler::new(true);
        let value = profiler.time_step("Step", || 41 + 1);
        assert_eq!(value, 42);
        assert_eq!(profiler.timings().len(), 1);

        assert_eq!(profiler.timings()[0].0, "Step");
        assert_eq!(profiler.total(), profiler.timings()[0].1);

        let mut disabled = StepProfiler::new(false);
        disabled.time_step("Step", || ());
        assert!(disabled.timings().is_empty());
        disabled.log_summary();
    }

    #[test]
    fn test_empty_source_is_an_error() {
        let source = InMemorySource::from_pages("empty", Vec::<String>::new());
        let mut tracker = DiscardTracker::new();
        let err = processor().extract(&source, &mut tracker).unwrap_err();
        assert!(matches!(err, ExtractionError::EmptyDocument(_)));
    }

    #[test]
    fn test_invalid_config_pattern_fails_construction() {
        let mut config = CleaningConfig::default();
        config.header_footer_patterns = vec!["[unclosed".to_string()];
        assert!(matches!(
            DocumentProcessor::new(config),
            Err(ExtractionError::Config(_))
        ));
    }
}
