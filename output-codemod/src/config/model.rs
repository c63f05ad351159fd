//! Typed configuration model for the migration run.
//!
//! Groups:
//! - [`MigrateConfig`]: top-level container for all config groups
//! - [`Filters`]: which files to walk / skip
//! - [`FrameworkConfig`]: module names, marker decorators and minimum version
//! - [`RewriteConfig`]: knobs for the emitted code
//!
//! All structs are `serde`-friendly so they can be loaded from YAML/JSON.

use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};

/// Top-level configuration for the migration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrateConfig {
    pub filters: Filters,
    pub framework: FrameworkConfig,
    pub rewrite: RewriteConfig,
}

impl MigrateConfig {
    /// Validate config sanity (no empty module names or degenerate limits).
    pub fn validate(&self) -> Result<()> {
        if self.filters.max_file_bytes == 0 {
            return Err(Error::InvalidConfig(
                "`max_file_bytes` must be greater than 0".into(),
            ));
        }
        if self.framework.package.trim().is_empty() {
            return Err(Error::InvalidConfig("`package` must not be empty".into()));
        }
        if self.framework.core_module.trim().is_empty()
            || self.framework.interop_module.trim().is_empty()
        {
            return Err(Error::InvalidConfig(
                "`core_module` and `interop_module` must not be empty".into(),
            ));
        }
        if self.framework.class_markers.is_empty() {
            return Err(Error::InvalidConfig(
                "`class_markers` must list at least one decorator".into(),
            ));
        }
        if self.framework.output_marker.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "`output_marker` must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// File filtering rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Filters {
    /// Glob patterns for files to ignore.
    pub ignore_globs: Vec<String>,
    /// Maximum file size to read (bytes).
    pub max_file_bytes: usize,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            ignore_globs: vec![
                "**/.git/**".into(),
                "**/node_modules/**".into(),
                "**/dist/**".into(),
                "**/*.d.ts".into(),
            ],
            max_file_bytes: 2 * 1024 * 1024, // 2 MB
        }
    }
}

/// Framework-specific names.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameworkConfig {
    /// Package whose version gates the run.
    pub package: String,
    /// Module exporting `output`.
    pub core_module: String,
    /// Module exporting `outputFromObservable`.
    pub interop_module: String,
    /// Class decorators that make a class eligible.
    pub class_markers: Vec<String>,
    /// Property decorator being migrated away from.
    pub output_marker: String,
    /// Minimum `(major, minor)` that ships `output()`.
    pub min_version: (u64, u64),
}

impl Default for FrameworkConfig {
    fn default() -> Self {
        Self {
            package: "@angular/core".into(),
            core_module: "@angular/core".into(),
            interop_module: "@angular/core/rxjs-interop".into(),
            class_markers: vec!["Component".into(), "Directive".into()],
            output_marker: "Output".into(),
            min_version: (17, 3),
        }
    }
}

/// Options for the emitted code.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RewriteConfig {
    /// Add `import { output }` to every tracked file before any class is
    /// visited, whether or not a conversion ends up needing it.
    pub eager_output_import: bool,
    /// JSDoc text attached to members added next to stream-backed outputs.
    pub migration_comment: String,
    /// Indentation used when the member's own indentation cannot be read.
    pub fallback_indent: String,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            eager_output_import: true,
            migration_comment:
                "TODO(migration): you may want to convert this to a normal output".into(),
            fallback_indent: "  ".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        MigrateConfig::default().validate().unwrap();
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let cfg: MigrateConfig =
            serde_yml::from_str("rewrite:\n  eager_output_import: false\n").unwrap();
        assert!(!cfg.rewrite.eager_output_import);
        assert_eq!(cfg.framework.core_module, "@angular/core");
        assert_eq!(cfg.filters.max_file_bytes, 2 * 1024 * 1024);
    }

    #[test]
    fn rejects_zero_file_limit() {
        let mut cfg = MigrateConfig::default();
        cfg.filters.max_file_bytes = 0;
        assert!(cfg.validate().is_err());
    }
}
