//! High-level orchestration of one `@Output()` migration run.
//!
//! Steps:
//! 1. **Gate**: validate options and the framework version in `package.json`.
//! 2. **Select**: resolve path / project / workspace to `.ts` files.
//! 3. **Track**: prefilter on text, parse eligible files into source units.
//! 4. **Rewrite**: per file, ensure the `output` import, then rewrite every
//!    eligible class.
//! 5. **Write**: serialize each unit and write it back when it changed.

use crate::{
    config::model::MigrateConfig,
    core::{
        manifest,
        select::Prefilter,
        store::{SourceStore, SourceUnit},
        summary::{FileReport, RunSummary},
        workspace::{self, ConvertOptions},
    },
    errors::Result,
    rewrite::{
        ADAPTER_FN, OUTPUT_FN,
        class_rewriter::ClassRewriter,
        classify::OutputPattern,
        imports::{ImportRequirement, ensure_import, has_import},
    },
};
use std::{fs, path::Path};
use tracing::{info, warn};

/// Migrate the selected part of the workspace at `root`.
#[tracing::instrument(level = "info", skip_all, fields(root = %root.display(), dry_run = options.dry_run))]
pub fn convert_outputs(
    root: &Path,
    options: &ConvertOptions,
    cfg: &MigrateConfig,
) -> Result<RunSummary> {
    let root = dunce::canonicalize(root)?;
    let mut summary = RunSummary::start(options.dry_run);

    // 1. Gate
    cfg.validate()?;
    manifest::check_workspace(&root, &cfg.framework)?;
    let selection = options.selection()?;

    // 2. Select
    let scan = workspace::resolve_files(&root, &selection, &cfg.filters)?;
    summary.record_scan(&scan);

    // 3. Track
    let prefilter = Prefilter::new(&cfg.framework)?;
    let mut store = SourceStore::new();
    for file in &scan.files {
        let text = match fs::read_to_string(&file.path) {
            Ok(t) => t,
            Err(err) => {
                warn!(path = %file.path.display(), error = %err, "unreadable file skipped");
                summary.counts.files_skipped += 1;
                continue;
            }
        };
        let eligibility = prefilter.check(&file.path, &text);
        summary.record_prefilter(eligibility);
        if !eligibility.is_eligible() {
            continue;
        }
        match store.track(&file.path, text) {
            Ok(()) => summary.record_tracked(),
            Err(err) => {
                warn!(path = %file.path.display(), error = %err, "failed to parse");
                summary.record_file(FileReport {
                    path: file.path.clone(),
                    error: Some(err.to_string()),
                    ..FileReport::default()
                });
            }
        }
    }
    info!(tracked = store.len(), "source units tracked");

    // 4-5. Rewrite and write back
    let rewriter = ClassRewriter::new(cfg);
    for unit in store.iter_mut() {
        let report = migrate_unit(unit, &rewriter, cfg, options.dry_run);
        summary.record_file(report);
    }

    info!("{}", summary.headline());
    info!("Conversion completed. Please check the content and run your formatter as needed.");
    Ok(summary)
}

/// Rewrite one unit and write it back. Failures are recorded on the report;
/// edits made before a failure are kept.
fn migrate_unit(
    unit: &mut SourceUnit,
    rewriter: &ClassRewriter<'_>,
    cfg: &MigrateConfig,
    dry_run: bool,
) -> FileReport {
    let mut report = FileReport {
        path: unit.path().to_path_buf(),
        ..FileReport::default()
    };

    if let Err(err) = rewrite_unit(unit, rewriter, cfg, &mut report) {
        warn!(path = %unit.path().display(), error = %err, "file processing stopped early");
        report.error = Some(err.to_string());
    }

    let text = unit.serialize();
    report.changed = text != unit.text();
    if report.changed && !dry_run {
        match fs::write(unit.path(), &text) {
            Ok(()) => {
                report.written = true;
                info!(path = %unit.path().display(), "file written");
            }
            Err(err) => {
                warn!(path = %unit.path().display(), error = %err, "write failed");
                report.error.get_or_insert_with(|| err.to_string());
            }
        }
    }
    report
}

fn rewrite_unit(
    unit: &mut SourceUnit,
    rewriter: &ClassRewriter<'_>,
    cfg: &MigrateConfig,
    report: &mut FileReport,
) -> Result<()> {
    let output_import = ImportRequirement::new(OUTPUT_FN, &cfg.framework.core_module);
    let adapter_import = ImportRequirement::new(ADAPTER_FN, &cfg.framework.interop_module);
    let had_adapter = has_import(unit, &adapter_import);

    if cfg.rewrite.eager_output_import && ensure_import(unit, &output_import)? {
        report.imports_added.push(output_import.statement());
    }

    // Classes stop at the first failure; imports requested so far stay.
    let mut outcome = Ok(());
    for class in unit.arena().classes() {
        if !rewriter.is_eligible(unit, class) {
            continue;
        }
        match rewriter.rewrite(unit, class) {
            Ok(class_report) => report.classes.push(class_report),
            Err(err) => {
                outcome = Err(err);
                break;
            }
        }
    }

    if !had_adapter && has_import(unit, &adapter_import) {
        report.imports_added.push(adapter_import.statement());
    }

    let emitted_plain_output = report
        .classes
        .iter()
        .flat_map(|c| c.converted.iter())
        .any(|c| c.pattern == OutputPattern::Emitter);
    if !cfg.rewrite.eager_output_import
        && emitted_plain_output
        && ensure_import(unit, &output_import)?
    {
        report.imports_added.push(output_import.statement());
    }

    outcome
}
