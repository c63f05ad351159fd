//! ng-convert-outputs: migrate `@Output()` properties to `output()` /
//! `outputFromObservable()` in an Angular workspace.
//!
//! ```bash
//! ng-convert-outputs --root ./my-app --project shop --dry-run
//! ```

use std::{fs, path::PathBuf, process::ExitCode};

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use output_codemod::{ConvertOptions, RunSummary, config, convert_outputs};
use tracing::error;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "ng-convert-outputs")]
#[command(version, about = "Convert @Output() properties to output() / outputFromObservable()", long_about = None)]
struct Args {
    /// Workspace root (the directory holding package.json)
    #[arg(long, env = "OUTPUT_MIGRATE_ROOT", default_value = ".")]
    root: PathBuf,

    /// File or directory to migrate, relative to the root
    #[arg(long)]
    path: Option<PathBuf>,

    /// Project to migrate (angular.json or Nx project name)
    #[arg(long)]
    project: Option<String>,

    /// YAML config file (defaults to <root>/.output-migrate.yml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Report what would change without writing files
    #[arg(long)]
    dry_run: bool,

    /// Write the JSON run summary to this file
    #[arg(long)]
    summary: Option<PathBuf>,
}

fn main() -> ExitCode {
    // Optional: a missing .env is fine.
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info,output_codemod=info"))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .init();

    let args = Args::parse();
    match run(args) {
        Ok(summary) => {
            println!("{} {}", "✔".green().bold(), summary.headline());
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{err:#}");
            eprintln!("{} {err:#}", "✘".red().bold());
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<RunSummary> {
    let cfg = config::load(&args.root, args.config.as_deref())
        .with_context(|| format!("loading config for {}", args.root.display()))?;

    let options = ConvertOptions {
        path: args.path,
        project: args.project,
        dry_run: args.dry_run,
    };
    let summary = convert_outputs(&args.root, &options, &cfg)?;

    if let Some(out) = &args.summary {
        let json = serde_json::to_string_pretty(&summary)?;
        fs::write(out, json).with_context(|| format!("writing summary to {}", out.display()))?;
    }
    Ok(summary)
}
