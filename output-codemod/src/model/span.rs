//! Source location model and helpers.
//!
//! `Span` stores a 0-based byte range into the original text of a source unit.
//! Spans are never rewritten after parsing: every edit is expressed against
//! the original offsets and resolved once at serialization.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    /// Inclusive start byte (0-based).
    pub start_byte: usize,
    /// Exclusive end byte (0-based).
    pub end_byte: usize,
}

impl Span {
    pub fn new(start_byte: usize, end_byte: usize) -> Self {
        Self {
            start_byte,
            end_byte,
        }
    }

    /// Zero-width span at `at`.
    pub fn point(at: usize) -> Self {
        Self::new(at, at)
    }

    /// Bytes spanned.
    pub fn byte_len(&self) -> usize {
        self.end_byte.saturating_sub(self.start_byte)
    }

    pub fn is_empty(&self) -> bool {
        self.byte_len() == 0
    }

    /// Extend the end of the span over any whitespace that follows it in `text`.
    pub fn extend_over_trailing_ws(&self, text: &str) -> Span {
        let tail = &text[self.end_byte.min(text.len())..];
        let ws = tail.len() - tail.trim_start().len();
        Span::new(self.start_byte, self.end_byte + ws)
    }

    /// Leading whitespace of the line `start_byte` sits on, if the span is the
    /// first thing on that line.
    pub fn line_indent<'a>(&self, text: &'a str) -> Option<&'a str> {
        let start = self.start_byte.min(text.len());
        let line_start = text[..start].rfind('\n').map(|i| i + 1).unwrap_or(0);
        let prefix = &text[line_start..start];
        prefix
            .chars()
            .all(|c| c == ' ' || c == '\t')
            .then_some(prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_ws_covers_newline_and_indent() {
        let text = "  @Output()\n  foo = 1;";
        let deco = Span::new(2, 11);
        let ext = deco.extend_over_trailing_ws(text);
        assert_eq!(&text[ext.start_byte..ext.end_byte], "@Output()\n  ");
    }

    #[test]
    fn indent_only_when_first_on_line() {
        let text = "class A {\n    x = 1;\n}";
        let x = Span::new(14, 20);
        assert_eq!(x.line_indent(text), Some("    "));
        let one = Span::new(18, 19);
        assert_eq!(one.line_indent(text), None);
    }
}
