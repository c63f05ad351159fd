//! Workspace selection: which projects and files a run covers.
//!
//! Projects come from `angular.json` (`projects.<name>.root`), else from every
//! Nx `project.json` below the workspace root; a workspace with neither is a
//! single project rooted at the workspace root.

use crate::{
    config::model::Filters,
    core::fs_scan::{ScanResult, is_skipped_dir, scan_ts_files},
    errors::{Error, Result},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Caller options for one run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConvertOptions {
    /// A file or directory, relative to the workspace root unless absolute.
    pub path: Option<PathBuf>,
    /// Name of a single project to migrate.
    pub project: Option<String>,
    /// Compute and report edits without writing any file.
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Path(PathBuf),
    Project(String),
    Workspace,
}

impl ConvertOptions {
    pub fn selection(&self) -> Result<Selection> {
        match (&self.path, &self.project) {
            (Some(_), Some(_)) => Err(Error::ConflictingSelection),
            (Some(p), None) => Ok(Selection::Path(p.clone())),
            (None, Some(name)) => Ok(Selection::Project(name.clone())),
            (None, None) => Ok(Selection::Workspace),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    pub root: PathBuf,
}

/// Discover the projects of a workspace.
pub fn discover_projects(root: &Path) -> Result<Vec<Project>> {
    let angular_json = root.join("angular.json");
    if angular_json.is_file() {
        let projects = from_angular_json(root, &angular_json)?;
        if !projects.is_empty() {
            info!(count = projects.len(), "projects read from angular.json");
            return Ok(projects);
        }
    }

    let projects = from_nx_project_files(root)?;
    if !projects.is_empty() {
        info!(count = projects.len(), "projects read from project.json files");
        return Ok(projects);
    }

    debug!("no project configuration found, using the workspace root");
    let name = root
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| ".".to_string());
    Ok(vec![Project {
        name,
        root: root.to_path_buf(),
    }])
}

fn from_angular_json(root: &Path, path: &Path) -> Result<Vec<Project>> {
    let doc: Value = serde_json::from_str(&fs::read_to_string(path)?)?;
    let Some(entries) = doc.get("projects").and_then(Value::as_object) else {
        warn!(path = %path.display(), "angular.json has no `projects` object");
        return Ok(Vec::new());
    };
    let projects = entries
        .iter()
        .map(|(name, cfg)| Project {
            name: name.clone(),
            root: root.join(cfg.get("root").and_then(Value::as_str).unwrap_or("")),
        })
        .collect();
    Ok(projects)
}

fn from_nx_project_files(root: &Path) -> Result<Vec<Project>> {
    let mut projects = Vec::new();
    let walker = WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| !is_skipped_dir(e));

    for entry in walker.filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() || entry.file_name() != "project.json" {
            continue;
        }
        let Some(dir) = entry.path().parent() else {
            continue;
        };
        let doc: Value = match fs::read_to_string(entry.path())
            .map_err(Error::from)
            .and_then(|raw| serde_json::from_str(&raw).map_err(Error::from))
        {
            Ok(v) => v,
            Err(err) => {
                warn!(path = %entry.path().display(), error = %err, "unreadable project.json skipped");
                continue;
            }
        };
        let name = doc
            .get("name")
            .and_then(Value::as_str)
            .map(String::from)
            .or_else(|| dir.file_name().map(|n| n.to_string_lossy().to_string()))
            .unwrap_or_else(|| ".".to_string());
        projects.push(Project {
            name,
            root: dir.to_path_buf(),
        });
    }

    projects.sort_by(|a, b| a.root.cmp(&b.root));
    Ok(projects)
}

/// Resolve a selection to the `.ts` files it covers.
#[tracing::instrument(level = "debug", skip(root, filters))]
pub fn resolve_files(root: &Path, selection: &Selection, filters: &Filters) -> Result<ScanResult> {
    match selection {
        Selection::Path(p) => {
            let target = if p.is_absolute() {
                p.clone()
            } else {
                root.join(p)
            };
            if !target.exists() {
                return Err(Error::PathNotFound(p.clone()));
            }
            scan_ts_files(&target, filters)
        }
        Selection::Project(name) => {
            let project = discover_projects(root)?
                .into_iter()
                .find(|p| &p.name == name)
                .ok_or_else(|| Error::ProjectNotFound(name.clone()))?;
            scan_ts_files(&project.root, filters)
        }
        Selection::Workspace => {
            let mut all = ScanResult::default();
            for project in discover_projects(root)? {
                if !project.root.exists() {
                    warn!(project = %project.name, root = %project.root.display(), "project root missing, skipped");
                    continue;
                }
                all.merge(scan_ts_files(&project.root, filters)?);
            }
            Ok(all)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn touch(root: &Path, rel: &str, body: &str) {
        let p = root.join(rel);
        fs::create_dir_all(p.parent().unwrap()).unwrap();
        fs::write(p, body).unwrap();
    }

    #[test]
    fn path_and_project_together_conflict() {
        let opts = ConvertOptions {
            path: Some("src".into()),
            project: Some("app".into()),
            dry_run: false,
        };
        let err = opts.selection().unwrap_err();
        assert!(err.is_eligibility());
        assert_eq!(
            err.to_string(),
            "Cannot pass both \"path\" and \"project\" to convert-outputs"
        );
        assert_eq!(ConvertOptions::default().selection().unwrap(), Selection::Workspace);
    }

    #[test]
    fn angular_json_projects_are_discovered() {
        let dir = tempdir().unwrap();
        touch(
            dir.path(),
            "angular.json",
            r#"{ "projects": { "shop": { "root": "projects/shop" }, "admin": { "root": "projects/admin" } } }"#,
        );
        let mut names: Vec<_> = discover_projects(dir.path())
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        names.sort();
        assert_eq!(names, vec!["admin", "shop"]);
    }

    #[test]
    fn nx_projects_and_project_selection() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        touch(root, "apps/web/project.json", r#"{ "name": "web" }"#);
        touch(root, "libs/ui/project.json", "{}");
        touch(root, "apps/web/src/app.component.ts", "x");
        touch(root, "libs/ui/src/button.component.ts", "x");

        let projects = discover_projects(root).unwrap();
        assert_eq!(
            projects.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(),
            vec!["web", "ui"]
        );

        let scan = resolve_files(root, &Selection::Project("ui".into()), &Filters::default()).unwrap();
        assert_eq!(scan.files.len(), 1);
        assert!(scan.files[0].path.ends_with("libs/ui/src/button.component.ts"));

        let err = resolve_files(root, &Selection::Project("nope".into()), &Filters::default())
            .unwrap_err();
        assert_eq!(err.to_string(), "\"nope\" project not found");
    }

    #[test]
    fn workspace_without_config_scans_root_and_missing_path_errors() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "src/a.ts", "x");
        let scan = resolve_files(dir.path(), &Selection::Workspace, &Filters::default()).unwrap();
        assert_eq!(scan.files.len(), 1);

        let err = resolve_files(
            dir.path(),
            &Selection::Path("missing/dir".into()),
            &Filters::default(),
        )
        .unwrap_err();
        assert!(err.is_selection());
    }
}
