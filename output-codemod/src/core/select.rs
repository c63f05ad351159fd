//! Candidate selector: a cheap textual prefilter run before any parsing.

use crate::{config::model::FrameworkConfig, errors::Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Eligibility {
    Eligible,
    NoClassMarker,
    NoOutputMarker,
}

impl Eligibility {
    pub fn is_eligible(self) -> bool {
        self == Eligibility::Eligible
    }
}

/// Matches `@Component` / `@Directive` and `@Output` as whole words.
#[derive(Debug, Clone)]
pub struct Prefilter {
    class_marker: Regex,
    output_marker: Regex,
}

impl Prefilter {
    pub fn new(cfg: &FrameworkConfig) -> Result<Self> {
        let classes = cfg
            .class_markers
            .iter()
            .map(|m| regex::escape(m))
            .collect::<Vec<_>>()
            .join("|");
        Ok(Self {
            class_marker: Regex::new(&format!(r"@(?:{classes})\b"))?,
            output_marker: Regex::new(&format!(r"@{}\b", regex::escape(&cfg.output_marker)))?,
        })
    }

    /// Decide whether a file's text is worth parsing.
    pub fn check(&self, path: &Path, text: &str) -> Eligibility {
        if !self.class_marker.is_match(text) {
            info!(path = %path.display(), "skipped: no class marker");
            return Eligibility::NoClassMarker;
        }
        if !self.output_marker.is_match(text) {
            info!(path = %path.display(), "skipped: component file without output marker");
            return Eligibility::NoOutputMarker;
        }
        Eligibility::Eligible
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefilter() -> Prefilter {
        Prefilter::new(&FrameworkConfig::default()).unwrap()
    }

    #[test]
    fn requires_both_markers() {
        let p = Path::new("x.ts");
        let f = prefilter();
        assert_eq!(
            f.check(p, "@Component({})\nclass A { @Output() a = b; }"),
            Eligibility::Eligible
        );
        assert_eq!(
            f.check(p, "@Directive()\nclass A { @Input() a = 1; }"),
            Eligibility::NoOutputMarker
        );
        assert_eq!(
            f.check(p, "class A { @Output() a = b; }"),
            Eligibility::NoClassMarker
        );
    }

    #[test]
    fn markers_match_whole_words() {
        let p = Path::new("x.ts");
        let f = prefilter();
        assert_eq!(
            f.check(p, "@ComponentStore()\nclass A { @Output() a = b; }"),
            Eligibility::NoClassMarker
        );
        assert_eq!(
            f.check(p, "@Component({})\nclass A { @OutputRef() a = b; }"),
            Eligibility::NoOutputMarker
        );
    }

    #[test]
    fn custom_markers_are_honored() {
        let cfg = FrameworkConfig {
            class_markers: vec!["Widget".into()],
            ..FrameworkConfig::default()
        };
        let f = Prefilter::new(&cfg).unwrap();
        let p = Path::new("x.ts");
        assert!(f.check(p, "@Widget()\nclass A { @Output() a = b; }").is_eligible());
        assert!(!f.check(p, "@Component()\nclass A { @Output() a = b; }").is_eligible());
    }
}
