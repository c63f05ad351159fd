//! Source-to-source migration of decorator-based `@Output()` properties to the
//! function-based `output()` / `outputFromObservable()` APIs.
//!
//! Entry point: [`convert_outputs`].

pub mod config;
pub mod core;
pub mod errors;
pub mod languages;
pub mod model;
pub mod rewrite;
pub mod run;

pub use crate::config::model::MigrateConfig;
pub use crate::core::{summary::RunSummary, workspace::ConvertOptions};
pub use crate::errors::{Error, Result};
pub use crate::run::convert_outputs;
