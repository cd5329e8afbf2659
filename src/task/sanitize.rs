use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::ManifestError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rename {
    pub from: PathBuf,
    pub to: PathBuf,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SanitizeReport {
    pub renamed: Vec<Rename>,
    pub collisions: Vec<Rename>,
    pub missing_dirs: Vec<PathBuf>,
    pub failed: usize,
}

pub fn sanitized_name(name: &str) -> String {
    name.replace(' ', "_").replace(['[', ']'], "")
}

fn sanitize_dir(
    dir: &Path,
    extension: &str,
    report: &mut SanitizeReport,
) -> Result<(), ManifestError> {
    let files = crate::list_files_with_suffix(dir, extension)?;
    for from in files {
        let Some(name) = from.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let clean = sanitized_name(name);
        if clean == name {
            continue;
        }
        let to = dir.join(&clean);
        if to.exists() {
            warn!(
                from = %from.display(),
                to = %to.display(),
                "sanitized name already exists, leaving file as is"
            );
            report.collisions.push(Rename { from, to });
            continue;
        }
        match std::fs::rename(&from, &to) {
            Ok(()) => {
                info!(
                    dir = %dir.display(),
                    original = name,
                    updated = %clean,
                    "sanitized filename"
                );
                report.renamed.push(Rename { from, to });
            }
            Err(e) => {
                error!(error = %ManifestError::io(&from, e), "failed to rename");
                report.failed += 1;
            }
        }
    }
    Ok(())
}

pub fn run_sanitize(cfg: &Config) -> SanitizeReport {
    let mut report = SanitizeReport::default();
    for dir in cfg.sanitize_paths() {
        info!(dir = %dir.display(), "sanitizing filenames");
        match sanitize_dir(&dir, &cfg.archive_extension, &mut report) {
            Ok(()) => {}
            Err(ManifestError::MissingDirectory(path)) => {
                warn!(dir = %path.display(), "directory not found, skipping");
                report.missing_dirs.push(path);
            }
            Err(e) => {
                error!(error = %e, "failed to sanitize directory");
                report.failed += 1;
            }
        }
    }
    info!(
        renamed = report.renamed.len(),
        collisions = report.collisions.len(),
        "finished sanitizing filenames"
    );
    report
}
