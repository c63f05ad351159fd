//! Run summary: counters and per-file reports collected during one migration.
//!
//! Serialized as-is by the binary (`--summary FILE`); keep field names stable
//! and snake_case.

use crate::{
    core::{fs_scan::ScanResult, select::Eligibility},
    rewrite::{class_rewriter::ClassReport, classify::OutputPattern},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, path::PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// ISO 8601 UTC timestamp when the run started.
    pub generated_at: String,
    pub dry_run: bool,
    pub counts: Counts,
    /// One entry per tracked (prefilter-eligible) file.
    pub files: Vec<FileReport>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Counts {
    /// Files found by the scanner, after ignore globs and size limits.
    pub files_scanned: usize,
    /// Files that passed the textual prefilter and were parsed.
    pub files_tracked: usize,
    pub files_skipped: usize,
    pub files_written: usize,
    pub files_failed: usize,
    pub classes_visited: usize,
    pub outputs_converted: usize,
    pub outputs_skipped: usize,
    pub outputs_by_pattern: BTreeMap<OutputPattern, usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub classes: Vec<ClassReport>,
    /// Import statements inserted into this file, verbatim.
    pub imports_added: Vec<String>,
    /// Whether the file's text changed (written unless dry-run).
    pub changed: bool,
    pub written: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RunSummary {
    pub fn start(dry_run: bool) -> Self {
        let generated_at: DateTime<Utc> = Utc::now();
        Self {
            generated_at: generated_at.to_rfc3339(),
            dry_run,
            counts: Counts::default(),
            files: Vec::new(),
        }
    }

    pub fn record_scan(&mut self, scan: &ScanResult) {
        self.counts.files_scanned = scan.files.len();
    }

    /// Counts files the prefilter turned away. Eligible files are counted
    /// by [`RunSummary::record_tracked`] once they parse.
    pub fn record_prefilter(&mut self, eligibility: Eligibility) {
        if !eligibility.is_eligible() {
            self.counts.files_skipped += 1;
        }
    }

    pub fn record_tracked(&mut self) {
        self.counts.files_tracked += 1;
    }

    pub fn record_file(&mut self, report: FileReport) {
        for class in &report.classes {
            self.counts.classes_visited += 1;
            self.counts.outputs_converted += class.converted.len();
            self.counts.outputs_skipped += class.skipped.len();
            for c in &class.converted {
                *self.counts.outputs_by_pattern.entry(c.pattern).or_insert(0) += 1;
            }
        }
        if report.written {
            self.counts.files_written += 1;
        }
        if report.error.is_some() {
            self.counts.files_failed += 1;
        }
        self.files.push(report);
    }

    /// One-line human summary.
    pub fn headline(&self) -> String {
        format!(
            "{} outputs converted in {} classes; {} files {} ({} tracked, {} skipped, {} failed)",
            self.counts.outputs_converted,
            self.counts.classes_visited,
            if self.dry_run {
                self.files.iter().filter(|f| f.changed).count()
            } else {
                self.counts.files_written
            },
            if self.dry_run { "would change" } else { "written" },
            self.counts.files_tracked,
            self.counts.files_skipped,
            self.counts.files_failed,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rewrite::class_rewriter::ConvertedOutput;

    #[test]
    fn file_reports_roll_up_into_counts() {
        let mut summary = RunSummary::start(false);
        summary.record_prefilter(Eligibility::Eligible);
        summary.record_tracked();
        summary.record_prefilter(Eligibility::NoOutputMarker);
        summary.record_file(FileReport {
            path: "a.ts".into(),
            classes: vec![ClassReport {
                name: Some("A".into()),
                converted: vec![
                    ConvertedOutput {
                        name: "a".into(),
                        pattern: OutputPattern::Emitter,
                        emitted_as: None,
                    },
                    ConvertedOutput {
                        name: "b$".into(),
                        pattern: OutputPattern::OwnedStream,
                        emitted_as: Some("_b$".into()),
                    },
                ],
                skipped: vec!["c".into()],
                needed_adapter_import: true,
            }],
            imports_added: vec![],
            changed: true,
            written: true,
            error: None,
        });

        assert_eq!(summary.counts.files_tracked, 1);
        assert_eq!(summary.counts.files_skipped, 1);
        assert_eq!(summary.counts.outputs_converted, 2);
        assert_eq!(summary.counts.outputs_skipped, 1);
        assert_eq!(summary.counts.outputs_by_pattern[&OutputPattern::OwnedStream], 1);
        assert_eq!(summary.counts.files_written, 1);

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["counts"]["outputs_by_pattern"]["emitter"], 1);
        assert_eq!(json["files"][0]["classes"][0]["converted"][1]["emitted_as"], "_b$");
    }

    #[test]
    fn unparsed_eligible_file_counts_only_as_failed() {
        let mut summary = RunSummary::start(false);
        summary.record_prefilter(Eligibility::Eligible);
        summary.record_file(FileReport {
            path: "src/broken.component.ts".into(),
            error: Some("parse error".into()),
            ..FileReport::default()
        });

        assert_eq!(summary.counts.files_tracked, 0);
        assert_eq!(summary.counts.files_skipped, 0);
        assert_eq!(summary.counts.files_failed, 1);
    }
}
