use crate::config::CleaningConfig;
use crate::error::{ExtractionError, ExtractionResult};
use crate::lines::split_lines;
use crate::tracker::DiscardTracker;
use crate::types::DiscardType;

use super::line_rules::build_rule;

// Sequential line-rule pipeline infrastructure
pub trait LineRule: Send + Sync {
    fn name(&self) -> &str;
    fn discard_type(&self) -> DiscardType;
    fn reason(&self) -> &str;
    /// Evaluated against the line with surrounding whitespace stripped
    fn matches(&self, trimmed: &str) -> bool;
}

/// A line that survived cleaning, verbatim, with its 1-based line number on
/// the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetainedLine {
    pub line_number: usize,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanedPage {
    pub page_number: usize,
    pub lines: Vec<RetainedLine>,
}

impl CleanedPage {
    /// The page's contribution to the cleaned text: every retained line
    /// followed by '\n'.
    pub fn text(&self) -> String {
        let mut text = String::new();
        for line in &self.lines {
            text.push_str(&line.text);
            text.push('\n');
        }
        text
    }

    pub fn char_count(&self) -> usize {
        self.lines.iter().map(|l| l.text.chars().count() + 1).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn retained_texts(&self) -> Vec<&str> {
        self.lines.iter().map(|l| l.text.as_str()).collect()
    }
}

/// Runs the configured line rules over one page at a time.
///
/// Blank lines are always dropped first and only counted. Every other line
/// goes through the rules in order; the first rule that matches decides the
/// discard type and no later rule sees the line.
pub struct PageTextCleaner {
    rules: Vec<Box<dyn LineRule>>,
}

impl PageTextCleaner {
    /// Build the rule pipeline from the enabled rules of `config.pipeline`,
    /// skipping unknown names.
    pub fn from_config(config: &CleaningConfig) -> ExtractionResult<Self> {
        let mut rules = Vec::new();
        for name in config.enabled_rules() {
            match build_rule(name, config)? {
                Some(rule) => rules.push(rule),
                None => {
                    tracing::warn!(rule = name, "unknown line rule, skipping");
                }
            }
        }
        Ok(Self::with_rules(rules))
    }

    pub fn with_rules(rules: Vec<Box<dyn LineRule>>) -> Self {
        Self { rules }
    }

    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }

    /// First rule matching the trimmed line, if any
    pub fn classify(&self, trimmed: &str) -> Option<&dyn LineRule> {
        self.rules
            .iter()
            .find(|rule| rule.matches(trimmed))
            .map(|rule| rule.as_ref())
    }

    /// Clean one page given as raw text
    pub fn clean_page_text(
        &self,
        raw_text: &str,
        page_number: usize,
        tracker: &mut DiscardTracker,
    ) -> ExtractionResult<CleanedPage> {
        self.clean(&split_lines(raw_text), page_number, tracker)
    }

    /// Clean one page given as raw lines (without terminators).
    pub fn clean(
        &self,
        raw_lines: &[&str],
        page_number: usize,
        tracker: &mut DiscardTracker,
    ) -> ExtractionResult<CleanedPage> {
        if page_number == 0 {
            return Err(ExtractionError::PreconditionViolation(
                "page numbers are 1-indexed, got 0".to_string(),
            ));
        }

        let mut page = CleanedPage {
            page_number,
            lines: Vec::new(),
        };
        let mut processed = 0;
        let mut discarded = 0;

        for (index, raw) in raw_lines.iter().enumerate() {
            let line_number = index + 1;
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                tracker.record_silent(1, raw.chars().count() + 1);
                continue;
            }
            processed += 1;

            match self.classify(trimmed) {
                Some(rule) => {
                    tracker.record(
                        rule.discard_type(),
                        *raw,
                        page_number,
                        line_number,
                        rule.reason(),
                    )?;
                    // the dropped line's terminator
                    tracker.record_silent(0, 1);
                    discarded += 1;
                }
                None => page.lines.push(RetainedLine {
                    line_number,
                    text: raw.to_string(),
                }),
            }
        }

        tracker.add_lines_processed(processed);
        tracing::debug!(
            page = page_number,
            lines = processed,
            discarded,
            retained = page.lines.len(),
            "page cleaned"
        );
        Ok(page)
    }
}
