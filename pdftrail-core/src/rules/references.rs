use crate::config::CleaningConfig;
use crate::error::{ExtractionError, ExtractionResult};
use crate::lines::line_spans;
use crate::tracker::DiscardTracker;
use crate::types::{DiscardType, LineOrigin};

/// Cuts the bibliography off the end of the cleaned document.
///
/// The first line whose trimmed, lowercased text equals one of the configured
/// headings starts the references section. That line and everything after it
/// is dropped: the heading as `REFERENCES_SECTION`, each following non-blank
/// line as `BIBLIOGRAPHY_ENTRY`. Only one references section is assumed and
/// it is assumed to be last.
pub struct ReferenceSectionRemover {
    headings: Vec<String>,
}

impl ReferenceSectionRemover {
    pub fn new<I, S>(headings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            headings: headings
                .into_iter()
                .map(|h| h.as_ref().trim().to_lowercase())
                .collect(),
        }
    }

    pub fn from_config(config: &CleaningConfig) -> Self {
        Self::new(&config.reference_headings)
    }

    pub fn is_heading(&self, line: &str) -> bool {
        let normalized = line.trim().to_lowercase();
        !normalized.is_empty() && self.headings.iter().any(|h| *h == normalized)
    }

    /// Remove the references section from text that came from a single
    /// page. Lines are numbered from 1.
    pub fn remove(&self, text: &str, tracker: &mut DiscardTracker) -> ExtractionResult<String> {
        let origins: Vec<LineOrigin> = (1..=line_spans(text).len())
            .map(|line| LineOrigin { page: 1, line })
            .collect();
        self.remove_with_origins(text, &origins, tracker)
    }

    /// Remove the references section, attributing each discard to the page
    /// and line the text line came from. `origins` must hold one entry per
    /// line of `text`.
    pub fn remove_with_origins(
        &self,
        text: &str,
        origins: &[LineOrigin],
        tracker: &mut DiscardTracker,
    ) -> ExtractionResult<String> {
        let spans = line_spans(text);
        if spans.len() != origins.len() {
            return Err(ExtractionError::PreconditionViolation(format!(
                "{} line origins supplied for {} lines",
                origins.len(),
                spans.len()
            )));
        }

        let Some(heading_index) = spans.iter().position(|span| self.is_heading(span.text)) else {
            return Ok(text.to_string());
        };

        let heading = &spans[heading_index];
        let origin = origins[heading_index];
        tracker.record(
            DiscardType::ReferencesSection,
            heading.text,
            origin.page,
            origin.line,
            "References section header",
        )?;
        tracker.record_silent(0, 1);

        let mut entries = 0;
        for (span, origin) in spans.iter().zip(origins).skip(heading_index + 1) {
            if span.is_blank() {
                tracker.record_silent(1, span.char_len() + 1);
                continue;
            }
            tracker.record(
                DiscardType::BibliographyEntry,
                span.text,
                origin.page,
                origin.line,
                "Bibliography entry after references section",
            )?;
            tracker.record_silent(0, 1);
            entries += 1;
        }

        tracing::info!(
            page = origin.page,
            line = origin.line,
            entries,
            "removed references section"
        );
        Ok(text[..heading.start].to_string())
    }
}
