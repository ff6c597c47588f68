use crate::config::CleaningConfig;
use crate::error::{ExtractionError, ExtractionResult};
use crate::types::DiscardType;
use regex::Regex;

use super::engine::LineRule;

const MONTHS: &str = "jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?";

fn compile(pattern: &str) -> ExtractionResult<Regex> {
    Regex::new(pattern)
        .map_err(|e| ExtractionError::Config(format!("invalid pattern '{pattern}': {e}")))
}

fn compile_all(patterns: &[String]) -> ExtractionResult<Vec<Regex>> {
    patterns.iter().map(|p| compile(p)).collect()
}

// PageNumberRule - the whole line is a folio: "14", "- 14 -", "[14]", "(iv)" is not
pub struct PageNumberRule {
    pattern: Regex,
}

impl PageNumberRule {
    pub fn new(max_digits: usize) -> ExtractionResult<Self> {
        let digits = max_digits.max(1);
        let pattern = compile(&format!(
            r"^(?:[-–—]\s*)?[\[(]?\d{{1,{digits}}}[\])]?(?:\s*[-–—])?$"
        ))?;
        Ok(Self { pattern })
    }
}

impl LineRule for PageNumberRule {
    fn name(&self) -> &str {
        "PageNumber"
    }

    fn discard_type(&self) -> DiscardType {
        DiscardType::PageNumber
    }

    fn reason(&self) -> &str {
        "Standalone page number"
    }

    fn matches(&self, trimmed: &str) -> bool {
        self.pattern.is_match(trimmed)
    }
}

// ArxivMetadataRule - side-margin stamp "arXiv:1706.03762v7 [cs.CL] 2 Aug 2023"
pub struct ArxivMetadataRule {
    pattern: Regex,
}

impl ArxivMetadataRule {
    pub fn new() -> ExtractionResult<Self> {
        Ok(Self {
            pattern: compile(r"(?i)^arxiv:\s?\d+\.\d+")?,
        })
    }
}

impl LineRule for ArxivMetadataRule {
    fn name(&self) -> &str {
        "ArxivMetadata"
    }

    fn discard_type(&self) -> DiscardType {
        DiscardType::ArxivMetadata
    }

    fn reason(&self) -> &str {
        "arXiv header/footer"
    }

    fn matches(&self, trimmed: &str) -> bool {
        self.pattern.is_match(trimmed)
    }
}

// DateFooterRule - whole line is "<day> <month> <year>"
pub struct DateFooterRule {
    pattern: Regex,
}

impl DateFooterRule {
    pub fn new() -> ExtractionResult<Self> {
        Ok(Self {
            pattern: compile(&format!(r"(?i)^\d{{1,2}}\s+(?:{MONTHS})\.?,?\s+\d{{4}}$"))?,
        })
    }
}

impl LineRule for DateFooterRule {
    fn name(&self) -> &str {
        "DateFooter"
    }

    fn discard_type(&self) -> DiscardType {
        DiscardType::DateFooter
    }

    fn reason(&self) -> &str {
        "Date footer line"
    }

    fn matches(&self, trimmed: &str) -> bool {
        self.pattern.is_match(trimmed)
    }
}

// SeparatorLineRule - rules drawn with dashes, underscores, equals or dots
pub struct SeparatorLineRule;

impl SeparatorLineRule {
    const SEPARATOR_CHARS: [char; 8] = ['-', '_', '=', '.', '*', '–', '—', '·'];
    const MIN_RUN: usize = 3;
}

impl LineRule for SeparatorLineRule {
    fn name(&self) -> &str {
        "SeparatorLine"
    }

    fn discard_type(&self) -> DiscardType {
        DiscardType::SeparatorLine
    }

    fn reason(&self) -> &str {
        "Separator/divider line"
    }

    fn matches(&self, trimmed: &str) -> bool {
        let mut marks = 0;
        for c in trimmed.chars() {
            if Self::SEPARATOR_CHARS.contains(&c) {
                marks += 1;
            } else if !c.is_whitespace() {
                return false;
            }
        }
        marks >= Self::MIN_RUN
    }
}

// HeaderFooterRule - configured running banners ("Preprint. Under review.")
pub struct HeaderFooterRule {
    patterns: Vec<Regex>,
}

impl HeaderFooterRule {
    pub fn new(patterns: &[String]) -> ExtractionResult<Self> {
        Ok(Self {
            patterns: compile_all(patterns)?,
        })
    }
}

impl LineRule for HeaderFooterRule {
    fn name(&self) -> &str {
        "HeaderFooter"
    }

    fn discard_type(&self) -> DiscardType {
        DiscardType::HeaderFooter
    }

    fn reason(&self) -> &str {
        "Running header/footer"
    }

    fn matches(&self, trimmed: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(trimmed))
    }
}

// ShortLineRule - too short to carry meaning and not a recognized short shape
pub struct ShortLineRule {
    min_length: usize,
    exemptions: Vec<Regex>,
    reason: String,
}

impl ShortLineRule {
    pub fn new(min_length: usize, exemptions: &[String]) -> ExtractionResult<Self> {
        Ok(Self {
            min_length,
            exemptions: compile_all(exemptions)?,
            reason: format!("Too short (< {min_length} chars)"),
        })
    }
}

impl LineRule for ShortLineRule {
    fn name(&self) -> &str {
        "ShortLine"
    }

    fn discard_type(&self) -> DiscardType {
        DiscardType::ShortLine
    }

    fn reason(&self) -> &str {
        &self.reason
    }

    fn matches(&self, trimmed: &str) -> bool {
        trimmed.chars().count() < self.min_length
            && !self.exemptions.iter().any(|p| p.is_match(trimmed))
    }
}

/// Build a rule by its pipeline name. `Ok(None)` for unknown names.
pub fn build_rule(name: &str, config: &CleaningConfig) -> ExtractionResult<Option<Box<dyn LineRule>>> {
    let rule: Box<dyn LineRule> = match name {
        "PageNumber" => Box::new(PageNumberRule::new(config.page_number_max_digits)?),
        "ArxivMetadata" => Box::new(ArxivMetadataRule::new()?),
        "DateFooter" => Box::new(DateFooterRule::new()?),
        "SeparatorLine" => Box::new(SeparatorLineRule),
        "HeaderFooter" => Box::new(HeaderFooterRule::new(&config.header_footer_patterns)?),
        "ShortLine" => Box::new(ShortLineRule::new(
            config.min_line_length,
            &config.short_line_exemptions,
        )?),
        _ => return Ok(None),
    };
    Ok(Some(rule))
}
