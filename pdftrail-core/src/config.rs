use anyhow::Result;
use serde::{Deserialize, Serialize};

// Default value functions for serde
fn default_true() -> bool {
    true
}

fn default_page_number_max_digits() -> usize {
    4 // page numbers above 9999 are body text, not folios
}

fn default_min_line_length() -> usize {
    3
}

fn default_short_line_exemptions() -> Vec<String> {
    vec![
        r"^\[\d{1,3}\]$".to_string(),      // [7]  bare citation marker
        r"^[IVX]{1,4}\.?$".to_string(),    // IV.  roman section marker
        r"^[A-Z]\.?$".to_string(),         // A.   appendix / lettered section
    ]
}

fn default_reference_headings() -> Vec<String> {
    vec![
        "references".to_string(),
        "bibliography".to_string(),
        "works cited".to_string(),
        "literature cited".to_string(),
    ]
}

fn default_sentence_min_length() -> usize {
    10
}

fn default_abbreviations() -> Vec<String> {
    [
        "e.g", "i.e", "al", "etc", "cf", "vs", "fig", "figs", "eq", "eqs", "tab", "sec",
        "ch", "no", "nos", "vol", "pp", "p", "ed", "eds", "approx", "resp", "dr", "mr",
        "mrs", "ms", "prof", "jr", "sr", "st", "inc", "ltd", "dept", "univ", "def", "thm",
        "lem", "prop", "cor",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_paragraph_min_length() -> usize {
    20
}

fn default_section_patterns() -> Vec<String> {
    vec![
        "abstract".to_string(),
        "introduction".to_string(),
        "related work".to_string(),
        "background".to_string(),
        "methods".to_string(),
        "methodology".to_string(),
        "results".to_string(),
        "discussion".to_string(),
        "conclusion".to_string(),
        "conclusions".to_string(),
        "acknowledgments".to_string(),
        "acknowledgements".to_string(),
        "appendix".to_string(),
    ]
}

/// Every heuristic constant used by the cleaning and segmentation stages.
///
/// All fields carry serde defaults, so a YAML file only needs the keys it
/// overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleaningConfig {
    /// Line rules to run, in order. First match wins.
    #[serde(default)]
    pub pipeline: PipelineConfig,
    /// Longest digit run still treated as a standalone page number
    #[serde(default = "default_page_number_max_digits")]
    pub page_number_max_digits: usize,
    /// Trimmed lines shorter than this are SHORT_LINE candidates
    #[serde(default = "default_min_line_length")]
    pub min_line_length: usize,
    /// Regexes for short lines that are still meaningful content
    #[serde(default = "default_short_line_exemptions")]
    pub short_line_exemptions: Vec<String>,
    /// Regexes for running headers/footers (venue banners, preprint notices)
    #[serde(default)]
    pub header_footer_patterns: Vec<String>,
    /// Case-insensitive whole-line headings that open the bibliography
    #[serde(default = "default_reference_headings")]
    pub reference_headings: Vec<String>,
    #[serde(default)]
    pub sentence: SentenceConfig,
    #[serde(default)]
    pub paragraph: ParagraphConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// List of line rules to run in order
    pub rules: Vec<RuleConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Name of the rule
    pub name: String,
    /// Whether this rule is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl RuleConfig {
    fn enabled(name: &str) -> Self {
        Self {
            name: name.to_string(),
            enabled: true,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            rules: vec![
                RuleConfig::enabled("PageNumber"),
                RuleConfig::enabled("ArxivMetadata"),
                RuleConfig::enabled("DateFooter"),
                RuleConfig::enabled("SeparatorLine"),
                RuleConfig::enabled("HeaderFooter"),
                RuleConfig::enabled("ShortLine"),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentenceConfig {
    /// Fragments shorter than this are discarded as SHORT_LINE
    #[serde(default = "default_sentence_min_length")]
    pub min_length: usize,
    /// Lowercase words (without the final period) after which a period does
    /// not end a sentence
    #[serde(default = "default_abbreviations")]
    pub abbreviations: Vec<String>,
}

impl Default for SentenceConfig {
    fn default() -> Self {
        Self {
            min_length: default_sentence_min_length(),
            abbreviations: default_abbreviations(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParagraphConfig {
    /// Paragraphs shorter than this are discarded as SHORT_LINE
    #[serde(default = "default_paragraph_min_length")]
    pub min_length: usize,
    /// Unnumbered heading lines (case-insensitive) that start a paragraph
    #[serde(default = "default_section_patterns")]
    pub section_patterns: Vec<String>,
}

impl Default for ParagraphConfig {
    fn default() -> Self {
        Self {
            min_length: default_paragraph_min_length(),
            section_patterns: default_section_patterns(),
        }
    }
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            pipeline: PipelineConfig::default(),
            page_number_max_digits: default_page_number_max_digits(),
            min_line_length: default_min_line_length(),
            short_line_exemptions: default_short_line_exemptions(),
            header_footer_patterns: Vec::new(),
            reference_headings: default_reference_headings(),
            sentence: SentenceConfig::default(),
            paragraph: ParagraphConfig::default(),
        }
    }
}

impl CleaningConfig {
    /// Load config from a YAML file
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: CleaningConfig = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Load config with fallback to default
    pub fn load_with_fallback(path: Option<&str>) -> Self {
        match path {
            Some(p) => Self::load_from_file(p).unwrap_or_else(|e| {
                tracing::warn!(path = p, error = %e, "failed to load config, using defaults");
                Self::default()
            }),
            None => Self::default(),
        }
    }

    /// Names of enabled line rules in execution order
    pub fn enabled_rules(&self) -> impl Iterator<Item = &str> {
        self.pipeline
            .rules
            .iter()
            .filter(|rule| rule.enabled)
            .map(|rule| rule.name.as_str())
    }
}
