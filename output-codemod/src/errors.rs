//! Typed error for the output codemod crate.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serde json error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("yaml config error: {0}")]
    SerdeYaml(#[from] serde_yml::Error),

    #[error("tree-sitter language error: {0}")]
    TreeSitterLanguage(#[from] tree_sitter::LanguageError),

    #[error("tree-sitter parse error: {}", .0.display())]
    TreeSitterParse(PathBuf),

    #[error("invalid marker pattern: {0}")]
    Regex(#[from] regex::Error),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("package.json not found at {}", .0.display())]
    ManifestMissing(PathBuf),

    #[error("No {0} detected")]
    FrameworkMissing(String),

    #[error("cannot read framework version from {0:?}")]
    UnparseableVersion(String),

    #[error("output() is only available in v{required} and later (found {found})")]
    UnsupportedVersion { found: String, required: String },

    #[error("Cannot pass both \"path\" and \"project\" to convert-outputs")]
    ConflictingSelection,

    #[error("\"{}\" does not exist", .0.display())]
    PathNotFound(PathBuf),

    #[error("\"{0}\" project not found")]
    ProjectNotFound(String),

    #[error("overlapping edits at bytes {start}..{end}")]
    EditConflict { start: usize, end: usize },

    #[error("invalid state: {0}")]
    InvalidState(&'static str),
}

impl Error {
    /// Errors raised before any file is touched because the workspace or the
    /// options cannot be migrated at all.
    pub fn is_eligibility(&self) -> bool {
        matches!(
            self,
            Error::ManifestMissing(_)
                | Error::FrameworkMissing(_)
                | Error::UnparseableVersion(_)
                | Error::UnsupportedVersion { .. }
                | Error::ConflictingSelection
                | Error::InvalidConfig(_)
                | Error::Regex(_)
        )
    }

    /// Errors raised while resolving what to migrate.
    pub fn is_selection(&self) -> bool {
        matches!(self, Error::PathNotFound(_) | Error::ProjectNotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
