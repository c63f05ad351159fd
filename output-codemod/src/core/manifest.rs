//! Manifest gate: refuse to run against workspaces whose framework is missing
//! or too old to provide `output()`.

use crate::{
    config::model::FrameworkConfig,
    errors::{Error, Result},
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::{fmt, fs, path::Path};
use tracing::{debug, info};

static VERSION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)(?:\.(\d+))?").expect("valid version regex"));

/// Dependency tables searched, in order.
const DEPENDENCY_TABLES: [&str; 3] = ["dependencies", "peerDependencies", "devDependencies"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FrameworkVersion {
    pub major: u64,
    pub minor: u64,
}

impl FrameworkVersion {
    /// First `major[.minor]` of a semver range such as `^17.3.0` or `>=18`.
    pub fn from_range(range: &str) -> Option<Self> {
        let caps = VERSION_RE.captures(range)?;
        let major = caps.get(1)?.as_str().parse().ok()?;
        let minor = match caps.get(2) {
            Some(m) => m.as_str().parse().ok()?,
            None => 0,
        };
        Some(Self { major, minor })
    }
}

impl From<(u64, u64)> for FrameworkVersion {
    fn from((major, minor): (u64, u64)) -> Self {
        Self { major, minor }
    }
}

impl fmt::Display for FrameworkVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Version range of `package` declared in a parsed `package.json`.
pub fn declared_range<'a>(manifest: &'a Value, package: &str) -> Option<&'a str> {
    DEPENDENCY_TABLES
        .iter()
        .find_map(|table| manifest.get(*table)?.get(package)?.as_str())
}

/// Read `<root>/package.json` and check the framework version.
#[tracing::instrument(level = "debug", skip_all, fields(root = %root.display()))]
pub fn check_workspace(root: &Path, cfg: &FrameworkConfig) -> Result<FrameworkVersion> {
    let path = root.join("package.json");
    if !path.is_file() {
        return Err(Error::ManifestMissing(path));
    }
    let manifest: Value = serde_json::from_str(&fs::read_to_string(&path)?)?;
    check_manifest(&manifest, cfg)
}

pub fn check_manifest(manifest: &Value, cfg: &FrameworkConfig) -> Result<FrameworkVersion> {
    let range = declared_range(manifest, &cfg.package)
        .ok_or_else(|| Error::FrameworkMissing(cfg.package.clone()))?;
    debug!(package = %cfg.package, %range, "framework dependency found");

    let found = FrameworkVersion::from_range(range)
        .ok_or_else(|| Error::UnparseableVersion(range.to_string()))?;
    let required = FrameworkVersion::from(cfg.min_version);
    if found < required {
        return Err(Error::UnsupportedVersion {
            found: found.to_string(),
            required: required.to_string(),
        });
    }

    info!(package = %cfg.package, version = %found, "framework version accepted");
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn cfg() -> FrameworkConfig {
        FrameworkConfig::default()
    }

    #[test]
    fn range_prefixes_are_tolerated() {
        assert_eq!(
            FrameworkVersion::from_range("^17.3.0"),
            Some((17, 3).into())
        );
        assert_eq!(FrameworkVersion::from_range("~18.0.1"), Some((18, 0).into()));
        assert_eq!(FrameworkVersion::from_range(">=19"), Some((19, 0).into()));
        assert_eq!(FrameworkVersion::from_range("latest"), None);
    }

    #[test]
    fn tables_are_searched_in_order() {
        let manifest = json!({
            "devDependencies": { "@angular/core": "16.0.0" },
            "peerDependencies": { "@angular/core": "^18.1.0" }
        });
        assert_eq!(
            check_manifest(&manifest, &cfg()).unwrap(),
            FrameworkVersion::from((18, 1))
        );
    }

    #[test]
    fn old_missing_and_unparseable_versions_fail() {
        let old = json!({ "dependencies": { "@angular/core": "~17.2.4" } });
        let err = check_manifest(&old, &cfg()).unwrap_err();
        assert!(matches!(err, Error::UnsupportedVersion { .. }));
        assert!(err.to_string().starts_with("output() is only available in v17.3 and later"));

        let missing = json!({ "dependencies": { "rxjs": "^7.8.0" } });
        let err = check_manifest(&missing, &cfg()).unwrap_err();
        assert_eq!(err.to_string(), "No @angular/core detected");

        let weird = json!({ "dependencies": { "@angular/core": "next" } });
        assert!(matches!(
            check_manifest(&weird, &cfg()).unwrap_err(),
            Error::UnparseableVersion(_)
        ));
    }

    #[test]
    fn workspace_without_manifest_is_rejected() {
        let dir = tempdir().unwrap();
        let err = check_workspace(dir.path(), &cfg()).unwrap_err();
        assert!(err.is_eligibility());

        fs::write(
            dir.path().join("package.json"),
            r#"{ "dependencies": { "@angular/core": "^17.3.0" } }"#,
        )
        .unwrap();
        assert!(check_workspace(dir.path(), &cfg()).is_ok());
    }
}
