use std::collections::BTreeSet;
use std::path::Path;

use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::ManifestError;
use crate::metadata::document::ManifestFile;
use crate::metadata::side::Side;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NameList {
    names: BTreeSet<String>,
}

impl NameList {
    pub fn parse(text: &str) -> Self {
        let names = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_owned)
            .collect();
        Self { names }
    }

    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        match std::fs::read_to_string(path) {
            Ok(text) => Ok(Self::parse(&text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "name list not found, skipping");
                Ok(Self::default())
            }
            Err(e) => Err(ManifestError::io(path, e)),
        }
    }

    pub fn consume(&mut self, identity: &str) -> bool {
        self.names.remove(identity)
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn into_remaining(self) -> Vec<String> {
        self.names.into_iter().collect()
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SideReport {
    pub processed: usize,
    pub updated: usize,
    pub failed: usize,
    pub unmatched_client_patch: Vec<String>,
    pub unmatched_server_blacklist: Vec<String>,
}

// Patch list first, blacklist second: a mod on both lists ends up client.
pub fn reconcile(
    manifest: &mut ManifestFile,
    client_patch: &mut NameList,
    server_blacklist: &mut NameList,
) -> bool {
    let original = manifest.side().map(str::to_owned);

    if client_patch.consume(&manifest.identity) && manifest.side() != Some(Side::Both.as_str()) {
        manifest.set_side(Side::Both.as_str());
    }
    if server_blacklist.consume(&manifest.identity)
        && manifest.side() != Some(Side::Client.as_str())
    {
        manifest.set_side(Side::Client.as_str());
    }

    manifest.side() != original.as_deref()
}

pub fn run_update_sides(cfg: &Config) -> Result<SideReport, ManifestError> {
    let files = crate::list_files_with_suffix(&cfg.mods_path(), &cfg.manifest_extension)?;
    let mut client_patch = NameList::load(&cfg.client_patch_path())?;
    let mut server_blacklist = NameList::load(&cfg.server_blacklist_path())?;
    let mut report = SideReport::default();

    for path in files {
        let mut manifest = match ManifestFile::load(&path, &cfg.manifest_extension) {
            Ok(m) => m,
            Err(e) => {
                error!(error = %e, "failed to load manifest");
                report.failed += 1;
                continue;
            }
        };
        report.processed += 1;
        let before = manifest.side().unwrap_or_default().to_owned();
        if !reconcile(&mut manifest, &mut client_patch, &mut server_blacklist) {
            continue;
        }
        match manifest.save() {
            Ok(()) => {
                info!(
                    identity = %manifest.identity,
                    from = %before,
                    to = manifest.side().unwrap_or_default(),
                    "updated side"
                );
                report.updated += 1;
            }
            Err(e) => {
                error!(error = %e, "failed to write manifest");
                report.failed += 1;
            }
        }
    }

    report.unmatched_client_patch = client_patch.into_remaining();
    report.unmatched_server_blacklist = server_blacklist.into_remaining();
    for name in &report.unmatched_client_patch {
        warn!(name = %name, "client patch entry has no manifest");
    }
    for name in &report.unmatched_server_blacklist {
        warn!(name = %name, "server blacklist entry has no manifest");
    }

    info!(
        processed = report.processed,
        updated = report.updated,
        "finished updating mod sides"
    );
    Ok(report)
}
