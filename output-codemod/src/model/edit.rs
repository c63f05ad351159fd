//! Edit journal: structural edits expressed as byte-range operations against
//! the original text, applied in one pass at serialization time.
//!
//! Every edit is normalized to "replace `[start, end)` with `text`":
//! - removal: `text` is empty;
//! - insertion: `start == end`.
//!
//! Ranges of non-empty edits must not overlap; insertions may sit on the
//! boundary of a removed range but never strictly inside it. Insertions at the
//! same offset keep their recording order.

use crate::{
    errors::{Error, Result},
    model::span::Span,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub span: Span,
    pub text: String,
    seq: usize,
}

#[derive(Debug, Clone, Default)]
pub struct EditJournal {
    edits: Vec<Edit>,
}

impl EditJournal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn remove(&mut self, span: Span) -> Result<()> {
        self.record(span, String::new())
    }

    pub fn replace(&mut self, span: Span, text: impl Into<String>) -> Result<()> {
        self.record(span, text.into())
    }

    pub fn insert(&mut self, at: usize, text: impl Into<String>) -> Result<()> {
        self.record(Span::point(at), text.into())
    }

    fn record(&mut self, span: Span, text: String) -> Result<()> {
        if let Some(clash) = self.edits.iter().find(|e| overlaps(&e.span, &span)) {
            return Err(Error::EditConflict {
                start: clash.span.start_byte.min(span.start_byte),
                end: clash.span.end_byte.max(span.end_byte),
            });
        }
        let seq = self.edits.len();
        self.edits.push(Edit { span, text, seq });
        Ok(())
    }

    /// Apply all edits to `source`, producing the new text.
    pub fn apply(&self, source: &str) -> String {
        if self.edits.is_empty() {
            return source.to_owned();
        }

        let mut ordered: Vec<&Edit> = self.edits.iter().collect();
        ordered.sort_by_key(|e| (e.span.start_byte, e.span.end_byte, e.seq));

        let extra: usize = ordered.iter().map(|e| e.text.len()).sum();
        let mut out = String::with_capacity(source.len() + extra);
        let mut cursor = 0usize;
        for e in ordered {
            let start = e.span.start_byte.min(source.len()).max(cursor);
            out.push_str(&source[cursor..start]);
            out.push_str(&e.text);
            cursor = e.span.end_byte.min(source.len()).max(start);
        }
        out.push_str(&source[cursor..]);
        out
    }
}

fn overlaps(a: &Span, b: &Span) -> bool {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => false,
        (true, false) => b.start_byte < a.start_byte && a.start_byte < b.end_byte,
        (false, true) => a.start_byte < b.start_byte && b.start_byte < a.end_byte,
        (false, false) => a.start_byte < b.end_byte && b.start_byte < a.end_byte,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_after_then_remove_reads_as_replace() {
        let src = "a = 1; b = 2;";
        let mut j = EditJournal::new();
        j.insert(5, "a = 10").unwrap();
        j.remove(Span::new(0, 5)).unwrap();
        assert_eq!(j.apply(src), "a = 10; b = 2;");
    }

    #[test]
    fn replacement_stays_ahead_of_insert_at_its_end() {
        let src = "{ a; q }";
        let mut j = EditJournal::new();
        j.insert(6, "\n  z;").unwrap();
        j.replace(Span::new(5, 6), "q2").unwrap();
        assert_eq!(j.apply(src), "{ a; q2\n  z; }");
    }

    #[test]
    fn same_offset_inserts_keep_recording_order() {
        let src = "x;";
        let mut j = EditJournal::new();
        j.insert(2, "\nfirst;").unwrap();
        j.insert(2, "\nsecond;").unwrap();
        assert_eq!(j.apply(src), "x;\nfirst;\nsecond;");
    }

    #[test]
    fn rejects_overlapping_ranges() {
        let mut j = EditJournal::new();
        j.remove(Span::new(2, 8)).unwrap();
        assert!(j.remove(Span::new(5, 10)).is_err());
        assert!(j.insert(4, "x").is_err());
        assert!(j.insert(8, "ok").is_ok());
        assert_eq!(j.len(), 2);
    }

    #[test]
    fn empty_journal_is_identity() {
        let j = EditJournal::new();
        assert_eq!(j.apply("unchanged"), "unchanged");
    }
}
