//! Normalization helpers for paths and glob handling.

use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::Path;
use tracing::warn;

/// Replace OS-specific separators with `/`.
///
/// # Example
/// ```
/// use output_codemod::core::normalize::to_unix_sep;
///
/// assert_eq!(to_unix_sep("src\\app\\foo.ts"), "src/app/foo.ts");
/// ```
pub fn to_unix_sep<S: AsRef<str>>(s: S) -> String {
    s.as_ref().replace('\\', "/")
}

/// `true` for TypeScript sources the migration may touch.
pub fn is_typescript(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("ts"))
}

/// Build a [`GlobSet`] from patterns, skipping invalid or empty ones.
///
/// Returns `None` if the input list is empty or all patterns are invalid.
///
/// # Example
/// ```
/// use output_codemod::core::normalize::build_globset;
///
/// let gs = build_globset(&vec!["**/*.d.ts".to_string()]).unwrap();
/// assert!(gs.is_match("src/types/env.d.ts"));
/// ```
pub fn build_globset(patterns: &[String]) -> Option<GlobSet> {
    if patterns.is_empty() {
        return None;
    }
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        if pat.trim().is_empty() {
            continue;
        }
        match Glob::new(pat) {
            Ok(g) => {
                builder.add(g);
            }
            Err(err) => warn!(pattern = %pat, error = %err, "invalid ignore glob skipped"),
        }
    }
    builder.build().ok()
}

/// Return `true` if a path matches the ignore glob set.
pub fn is_ignored_by(path: &Path, set: Option<&GlobSet>) -> bool {
    set.is_some_and(|gs| gs.is_match(to_unix_sep(path.to_string_lossy())))
}
