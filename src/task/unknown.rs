use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::config::{Config, UnknownMod};
use crate::error::ManifestError;
use crate::metadata::modfile::{DownloadMode, ModDownload, ModToml};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GenerateReport {
    pub written: Vec<PathBuf>,
    pub skipped: usize,
}

fn manifest_name(filename: &str, extension: &str) -> String {
    let stem = Path::new(filename)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| filename.to_string());
    format!("{stem}{extension}")
}

fn write_manifest(cfg: &Config, entry: &UnknownMod, jar: &Path) -> Result<PathBuf, ManifestError> {
    let hash = crate::hash::hash_file_hex(cfg.unknown_mods_hash_format, jar)?;
    let manifest = ModToml {
        name: Some(entry.name.clone()),
        filename: entry.filename.clone(),
        side: entry.side,
        download: ModDownload {
            url: format!("{}{}", cfg.unknown_mods_url_base, entry.filename),
            hash: Some(hash),
            hash_format: Some(cfg.unknown_mods_hash_format),
            mode: DownloadMode::Url,
        },
    };
    let dest = cfg
        .mods_path()
        .join(manifest_name(&entry.filename, &cfg.manifest_extension));
    let text = toml::to_string(&manifest).map_err(|source| ManifestError::Serialize {
        path: dest.clone(),
        source,
    })?;
    crate::write_atomic(&dest, text.as_bytes())?;
    Ok(dest)
}

pub fn run_generate(cfg: &Config) -> Result<GenerateReport, ManifestError> {
    let mut report = GenerateReport::default();
    if cfg.unknown_mods.is_empty() {
        return Ok(report);
    }
    let mods = cfg.mods_path();
    if !mods.is_dir() {
        return Err(ManifestError::MissingDirectory(mods));
    }
    let source = cfg.unknown_mods_path();
    if !source.is_dir() {
        warn!(dir = %source.display(), "unknown mods directory not found, skipping");
        return Ok(report);
    }

    for entry in &cfg.unknown_mods {
        if entry.name.is_empty() || entry.filename.is_empty() {
            error!(?entry, "unknown mod is missing a name or filename, skipping");
            report.skipped += 1;
            continue;
        }
        let jar = source.join(&entry.filename);
        if !jar.is_file() {
            warn!(jar = %jar.display(), "jar not found, skipping");
            report.skipped += 1;
            continue;
        }
        match write_manifest(cfg, entry, &jar) {
            Ok(dest) => {
                info!(filename = %entry.filename, path = %dest.display(), "wrote manifest");
                report.written.push(dest);
            }
            Err(e) => {
                error!(error = %e, "failed to write manifest");
                report.skipped += 1;
            }
        }
    }
    Ok(report)
}
