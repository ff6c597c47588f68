use super::{trim_span, SegmentCollector, Segmenter};
use crate::boundaries::PageBoundaries;
use crate::config::SentenceConfig;
use crate::error::ExtractionResult;
use crate::tracker::DiscardTracker;
use crate::types::{DiscardType, SegmentKind, Segmentation};
use std::collections::HashSet;

const TERMINALS: [char; 3] = ['.', '!', '?'];
const CLOSERS: [char; 6] = ['"', '\'', '”', '’', ')', ']'];
const OPENERS: [char; 5] = ['"', '\'', '“', '‘', '('];
/// Line breaks a bracketed span may cross and still suppress splits
const MAX_BRACKET_LINES: usize = 1;

/// Splits text at `.`, `!` or `?` followed by whitespace and a capital
/// letter, or by the end of the text.
///
/// No split happens inside `[...]` or `(...)`, after a known abbreviation,
/// or after a single capital initial ("J. Smith").
pub struct SentenceSegmenter {
    min_length: usize,
    abbreviations: HashSet<String>,
}

impl SentenceSegmenter {
    pub fn new(config: &SentenceConfig) -> Self {
        Self {
            min_length: config.min_length,
            abbreviations: config
                .abbreviations
                .iter()
                .map(|a| a.trim().trim_end_matches('.').to_lowercase())
                .collect(),
        }
    }

    /// Character ranges of the raw sentence candidates, untrimmed
    pub fn split_points(&self, chars: &[char]) -> Vec<(usize, usize)> {
        let mut spans = Vec::new();
        let mut start = 0;
        let mut square = 0usize;
        let mut round = 0usize;
        let mut i = 0;

        while i < chars.len() {
            match chars[i] {
                '[' if closes_nearby(chars, i, '[', ']') => square += 1,
                ']' => square = square.saturating_sub(1),
                '(' if closes_nearby(chars, i, '(', ')') => round += 1,
                ')' => round = round.saturating_sub(1),
                c if TERMINALS.contains(&c) && square == 0 && round == 0 => {
                    let mut end = i + 1;
                    while end < chars.len() && TERMINALS.contains(&chars[end]) {
                        end += 1;
                    }
                    while end < chars.len() && CLOSERS.contains(&chars[end]) {
                        end += 1;
                    }
                    if self.is_boundary(chars, i, end) {
                        spans.push((start, end));
                        start = end;
                    }
                    i = end;
                    continue;
                }
                _ => {}
            }
            i += 1;
        }

        if start < chars.len() {
            spans.push((start, chars.len()));
        }
        spans
    }

    /// `punct` is the terminal character, `end` the index just past the
    /// terminal run and any closing quotes.
    fn is_boundary(&self, chars: &[char], punct: usize, end: usize) -> bool {
        if end < chars.len() {
            if !chars[end].is_whitespace() {
                return false;
            }
            let mut next = end;
            while next < chars.len() && chars[next].is_whitespace() {
                next += 1;
            }
            while next < chars.len() && OPENERS.contains(&chars[next]) {
                next += 1;
            }
            if next < chars.len() && !chars[next].is_uppercase() {
                return false;
            }
        }
        !(chars[punct] == '.' && self.ends_with_abbreviation(chars, punct))
    }

    fn ends_with_abbreviation(&self, chars: &[char], period: usize) -> bool {
        let mut word_start = period;
        while word_start > 0 && !chars[word_start - 1].is_whitespace() {
            word_start -= 1;
        }
        let word: String = chars[word_start..period]
            .iter()
            .skip_while(|c| OPENERS.contains(*c) || **c == '[')
            .collect();

        let mut letters = word.chars();
        if let (Some(first), None) = (letters.next(), letters.next()) {
            if first.is_uppercase() {
                return true;
            }
        }
        self.abbreviations.contains(&word.to_lowercase())
    }
}

/// Whether the bracket opened at `open_at` is closed before the end of the
/// following line. Unclosed openers ("[0, 1)", a stray "(a") do not suppress
/// splitting.
fn closes_nearby(chars: &[char], open_at: usize, open: char, close: char) -> bool {
    let mut depth = 0usize;
    let mut newlines = 0;
    for &c in &chars[open_at + 1..] {
        if c == '\n' {
            newlines += 1;
            if newlines > MAX_BRACKET_LINES {
                return false;
            }
        } else if c == open {
            depth += 1;
        } else if c == close {
            if depth == 0 {
                return true;
            }
            depth -= 1;
        }
    }
    false
}

/// Digits with at most a trailing terminal, e.g. "12" or "12."
fn is_bare_number(fragment: &[char]) -> bool {
    let mut digits = fragment;
    while let Some((last, rest)) = digits.split_last() {
        if !TERMINALS.contains(last) {
            break;
        }
        digits = rest;
    }
    !digits.is_empty() && digits.iter().all(|c| c.is_ascii_digit())
}

impl Segmenter for SentenceSegmenter {
    fn kind(&self) -> SegmentKind {
        SegmentKind::Sentence
    }

    fn segment(
        &self,
        text: &str,
        boundaries: &PageBoundaries,
        tracker: &mut DiscardTracker,
    ) -> ExtractionResult<Segmentation> {
        let chars: Vec<char> = text.chars().collect();
        let short_reason = format!("Sentence < {} chars", self.min_length);
        let mut collector = SegmentCollector::new(&chars, boundaries);

        for (raw_start, raw_end) in self.split_points(&chars) {
            let Some((start, end)) = trim_span(&chars, raw_start, raw_end) else {
                continue;
            };
            if is_bare_number(&chars[start..end]) {
                collector.discard(
                    tracker,
                    DiscardType::PageNumber,
                    start,
                    end,
                    "Sentence is just a number",
                )?;
            } else if end - start < self.min_length {
                collector.discard(tracker, DiscardType::ShortLine, start, end, &short_reason)?;
            } else {
                collector.emit(start, end);
            }
        }

        let segmentation = collector.finish(tracker);
        tracing::debug!(sentences = segmentation.len(), "sentence segmentation done");
        Ok(segmentation)
    }
}
