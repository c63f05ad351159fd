//! Configuration loading.
//!
//! Layering, lowest to highest priority:
//! 1. built-in defaults ([`MigrateConfig::default`]);
//! 2. a YAML file: the explicit path if given, else `<root>/.output-migrate.yml` when present;
//! 3. environment variables (`OUTPUT_MIGRATE_*`).

pub mod model;

use crate::errors::Result;
use model::MigrateConfig;
use std::{fs, path::Path};
use tracing::{debug, info};

/// File name looked up at the workspace root when no explicit config is given.
pub const DEFAULT_CONFIG_FILE: &str = ".output-migrate.yml";

/// Load the config for a workspace root, apply env overrides and validate.
pub fn load(root: &Path, explicit: Option<&Path>) -> Result<MigrateConfig> {
    let candidate = match explicit {
        Some(p) => Some(p.to_path_buf()),
        None => Some(root.join(DEFAULT_CONFIG_FILE)).filter(|p| p.is_file()),
    };

    let mut cfg = match candidate {
        Some(path) => {
            info!(path = %path.display(), "loading config file");
            let raw = fs::read_to_string(&path)?;
            serde_yml::from_str::<MigrateConfig>(&raw)?
        }
        None => MigrateConfig::default(),
    };

    apply_env(&mut cfg);
    cfg.validate()?;
    debug!(?cfg, "configuration resolved");
    Ok(cfg)
}

/// Override selected fields from the environment.
pub fn apply_env(cfg: &mut MigrateConfig) {
    if let Some(v) = env_opt("OUTPUT_MIGRATE_CORE_MODULE") {
        cfg.framework.core_module = v;
    }
    if let Some(v) = env_opt("OUTPUT_MIGRATE_INTEROP_MODULE") {
        cfg.framework.interop_module = v;
    }
    if let Some(v) = env_opt("OUTPUT_MIGRATE_IGNORE_GLOBS") {
        cfg.filters.ignore_globs.extend(
            v.split(',')
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(String::from),
        );
    }
    cfg.filters.max_file_bytes = parse("OUTPUT_MIGRATE_MAX_FILE_BYTES", cfg.filters.max_file_bytes);
    cfg.rewrite.eager_output_import = parse(
        "OUTPUT_MIGRATE_EAGER_OUTPUT_IMPORT",
        cfg.rewrite.eager_output_import,
    );
}

fn env_opt(k: &str) -> Option<String> {
    std::env::var(k).ok().filter(|v| !v.trim().is_empty())
}

fn parse<T: std::str::FromStr>(k: &str, dflt: T) -> T {
    std::env::var(k)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(dflt)
}
