//! Filesystem scanning for TypeScript sources under one or more roots.

use crate::{
    config::model::Filters,
    core::normalize::{build_globset, is_ignored_by, is_typescript},
    errors::{Error, Result},
};
use globset::GlobSet;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ScannedFile {
    pub path: PathBuf,
    pub size: u64,
}

#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    pub files: Vec<ScannedFile>,
    pub skipped_ignored: usize,
    pub skipped_too_big: usize,
}

impl ScanResult {
    /// Merge another scan, keeping files sorted and unique by path.
    pub fn merge(&mut self, other: ScanResult) {
        self.files.extend(other.files);
        self.files.sort();
        self.files.dedup_by(|a, b| a.path == b.path);
        self.skipped_ignored += other.skipped_ignored;
        self.skipped_too_big += other.skipped_too_big;
    }
}

/// Collect `.ts` files below `root` (or `root` itself when it is a file).
pub fn scan_ts_files(root: &Path, filters: &Filters) -> Result<ScanResult> {
    if !root.exists() {
        return Err(Error::PathNotFound(root.to_path_buf()));
    }

    debug!("fs_scan: start -> {}", root.display());

    let ignore_globs: Option<GlobSet> = build_globset(&filters.ignore_globs);
    let mut result = ScanResult::default();

    let walker = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| !is_skipped_dir(e));

    for entry in walker.filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() || !is_typescript(entry.path()) {
            continue;
        }
        let path = entry.path();

        if is_ignored_by(path, ignore_globs.as_ref()) {
            result.skipped_ignored += 1;
            debug!("fs_scan: ignore (glob) {}", path.display());
            continue;
        }

        let size = match fs::metadata(path) {
            Ok(m) => m.len(),
            Err(err) => {
                warn!("fs_scan: metadata failed for {}: {}", path.display(), err);
                continue;
            }
        };
        if size as usize > filters.max_file_bytes {
            result.skipped_too_big += 1;
            debug!(
                "fs_scan: skip (size {} > max {}) {}",
                size,
                filters.max_file_bytes,
                path.display()
            );
            continue;
        }

        result.files.push(ScannedFile {
            path: path.to_path_buf(),
            size,
        });
    }

    result.files.sort();
    info!(
        "fs_scan: done {} -> total={} (ignored={}, too_big={})",
        root.display(),
        result.files.len(),
        result.skipped_ignored,
        result.skipped_too_big
    );
    Ok(result)
}

/// Vendor and build folders never descended into (the walk root itself is exempt).
pub(crate) fn is_skipped_dir(entry: &DirEntry) -> bool {
    if entry.depth() > 0 && entry.file_type().is_dir() {
        if let Some(name) = entry.file_name().to_str() {
            return matches!(
                name,
                ".git"
                    | "node_modules"
                    | "dist"
                    | "build"
                    | "target"
                    | ".angular"
                    | ".nx"
                    | ".idea"
                    | ".vscode"
            );
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn touch(root: &Path, rel: &str, body: &str) {
        let p = root.join(rel);
        fs::create_dir_all(p.parent().unwrap()).unwrap();
        fs::write(p, body).unwrap();
    }

    #[test]
    fn collects_sorted_ts_files_and_skips_vendor_dirs() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        touch(root, "src/b.component.ts", "x");
        touch(root, "src/a.component.ts", "x");
        touch(root, "src/a.component.html", "x");
        touch(root, "node_modules/lib/index.ts", "x");
        touch(root, "dist/out.ts", "x");
        touch(root, "src/env.d.ts", "x");

        let scan = scan_ts_files(root, &Filters::default()).unwrap();
        let names: Vec<_> = scan
            .files
            .iter()
            .map(|f| f.path.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(names, vec!["src/a.component.ts", "src/b.component.ts"]);
        assert_eq!(scan.skipped_ignored, 1);
    }

    #[test]
    fn oversized_files_are_skipped() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "big.ts", &"x".repeat(64));
        let filters = Filters {
            max_file_bytes: 10,
            ..Filters::default()
        };
        let scan = scan_ts_files(dir.path(), &filters).unwrap();
        assert!(scan.files.is_empty());
        assert_eq!(scan.skipped_too_big, 1);
    }

    #[test]
    fn single_file_root_and_missing_root() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "one.ts", "x");
        let scan = scan_ts_files(&dir.path().join("one.ts"), &Filters::default()).unwrap();
        assert_eq!(scan.files.len(), 1);

        let err = scan_ts_files(&dir.path().join("nope"), &Filters::default()).unwrap_err();
        assert!(err.is_selection());
    }
}
