// Rules module - line-level cleaning and document-level reference removal
// - engine.rs: LineRule trait and the PageTextCleaner pipeline
// - line_rules.rs: the individual per-line heuristics
// - references.rs: ReferenceSectionRemover

pub mod engine;
pub mod line_rules;
pub mod references;

pub use engine::*;
pub use line_rules::{
    build_rule, ArxivMetadataRule, DateFooterRule, HeaderFooterRule, PageNumberRule,
    SeparatorLineRule, ShortLineRule,
};
pub use references::ReferenceSectionRemover;
