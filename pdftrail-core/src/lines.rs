// Line model shared by the cleaner, the reference remover and the segmenters.
//
// Text is split on '\n'. A final '\n' terminates the last line rather than
// opening an empty one, so "" has no lines and "a\n" has exactly one.
// Every line owns one terminator character for accounting purposes, whether
// or not the source text actually ended with it.

/// One line of a text with its byte position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSpan<'a> {
    /// Byte offset of the first character of the line
    pub start: usize,
    /// Line content without the terminating '\n'
    pub text: &'a str,
}

impl<'a> LineSpan<'a> {
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

pub fn line_spans(text: &str) -> Vec<LineSpan<'_>> {
    let mut spans = Vec::new();
    let mut start = 0;
    for piece in text.split_inclusive('\n') {
        spans.push(LineSpan {
            start,
            text: piece.strip_suffix('\n').unwrap_or(piece),
        });
        start += piece.len();
    }
    spans
}

pub fn split_lines(text: &str) -> Vec<&str> {
    line_spans(text).into_iter().map(|span| span.text).collect()
}

/// Characters in `text` counted the way the tracker counts them: each line
/// plus one terminator.
pub fn line_unit_len(text: &str) -> usize {
    line_spans(text).iter().map(|span| span.char_len() + 1).sum()
}

pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_lines_edge_cases() {
        assert!(split_lines("").is_empty());
        assert_eq!(split_lines("a\n"), vec!["a"]);
        assert_eq!(split_lines("a"), vec!["a"]);
        assert_eq!(split_lines("a\n\nb"), vec!["a", "", "b"]);
        assert_eq!(split_lines("\n\n14\n"), vec!["", "", "14"]);
    }

    #[test]
    fn test_line_spans_track_byte_starts() {
        let spans = line_spans("ab\ncd\ne");
        assert_eq!(spans[1].start, 3);
        assert_eq!(spans[2].start, 6);
        assert_eq!(spans[2].text, "e");
    }

    #[test]
    fn test_line_unit_len_counts_implicit_terminator() {
        assert_eq!(line_unit_len("abc\n"), 4);
        assert_eq!(line_unit_len("abc"), 4);
        assert_eq!(line_unit_len(""), 0);
        assert_eq!(line_unit_len("é\n\n"), 3);
    }
}
