pub mod cli;
pub mod config;
pub mod error;
pub mod hash;
pub mod metadata;
pub mod task;

use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};

use crate::cli::{Cli, Command, ReportFormat};
use crate::config::Config;
use crate::error::ManifestError;
use crate::task::check::CheckReport;

pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), ManifestError> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| ManifestError::io(path, e))?;
    tmp.write_all(contents).map_err(|e| ManifestError::io(path, e))?;
    if let Ok(meta) = std::fs::metadata(path) {
        tmp.as_file()
            .set_permissions(meta.permissions())
            .map_err(|e| ManifestError::io(path, e))?;
    }
    tmp.persist(path).map_err(|e| ManifestError::io(path, e.error))?;
    Ok(())
}

pub(crate) fn list_files_with_suffix(
    dir: &Path,
    suffix: &str,
) -> Result<Vec<PathBuf>, ManifestError> {
    if !dir.is_dir() {
        return Err(ManifestError::MissingDirectory(dir.to_path_buf()));
    }
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|e| ManifestError::io(dir, e))? {
        let entry = entry.map_err(|e| ManifestError::io(dir, e))?;
        let path = entry.path();
        let matches = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.ends_with(suffix));
        if matches && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn load_config(cli: &Cli) -> Result<Config> {
    let root = match &cli.root {
        Some(root) => root.clone(),
        None => std::env::current_dir().context("failed to resolve the current directory")?,
    };
    let mut cfg = match &cli.config {
        Some(path) => Config::load(path)?.rebase(&root),
        None => Config::discover(&root)?,
    };
    if let Some(mods_dir) = &cli.mods_dir {
        cfg.mods_dir = mods_dir.clone();
    }
    Ok(cfg)
}

fn log_skipped<T>(result: Result<T, ManifestError>) -> Option<T> {
    result
        .inspect_err(|e| error!(error = %e, "nothing to do"))
        .ok()
}

fn print_check(report: &CheckReport, format: ReportFormat) -> Result<()> {
    match format {
        ReportFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
        ReportFormat::Text => {
            for finding in &report.findings {
                let level = match finding.severity {
                    task::check::Severity::Error => "error",
                    task::check::Severity::Warning => "warning",
                };
                println!("{level}: {}: {}", finding.path.display(), finding.issue);
            }
            println!(
                "checked {} manifests: {} errors, {} warnings",
                report.checked,
                report.errors(),
                report.warnings()
            );
        }
    }
    Ok(())
}

pub fn run(cli: Cli) -> Result<ExitCode> {
    let cfg = load_config(&cli)?;
    info!(command = ?cli.command, root = %cfg.root.display(), "starting packwiz-prep");

    match cli.command {
        Command::Strip => {
            log_skipped(task::strip::run_strip(&cfg));
        }
        Command::FixUrls => {
            log_skipped(task::urls::run_fix_urls(&cfg));
        }
        Command::Sides => {
            log_skipped(task::side::run_update_sides(&cfg));
        }
        Command::Sanitize => {
            task::sanitize::run_sanitize(&cfg);
        }
        Command::Generate => {
            log_skipped(task::unknown::run_generate(&cfg));
        }
        Command::Check { format, strict } => {
            let Some(report) = log_skipped(task::check::run_check(&cfg)) else {
                return Ok(if strict { ExitCode::FAILURE } else { ExitCode::SUCCESS });
            };
            print_check(&report, format)?;
            if strict && report.errors() > 0 {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Run { publish, strict } => {
            let report = task::pipeline::run_pipeline(&cfg);
            if publish {
                if !report.is_clean() {
                    anyhow::bail!("pipeline reported problems, refusing to publish");
                }
                task::publish::publish(&cfg).context("failed to publish pack")?;
            }
            if strict && !report.is_clean() {
                return Ok(ExitCode::FAILURE);
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}
