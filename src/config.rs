use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::metadata::modfile::HashFormat;
use crate::metadata::side::Side;

pub const CONFIG_FILE_NAME: &str = "packwiz-prep.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    pub root: PathBuf,
    pub mods_dir: PathBuf,
    pub manifest_extension: String,
    pub ephemeral_keys: Vec<String>,
    pub client_patch_file: PathBuf,
    pub server_blacklist_file: PathBuf,
    pub sanitize_dirs: Vec<PathBuf>,
    pub archive_extension: String,
    pub unknown_mods_dir: PathBuf,
    pub unknown_mods_url_base: String,
    pub unknown_mods_hash_format: HashFormat,
    pub unknown_mods: Vec<UnknownMod>,
    pub pack_file: PathBuf,
    pub signature_file: PathBuf,
    pub signing_key: PathBuf,
    pub packaging_command: Vec<String>,
    pub signing_program: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UnknownMod {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub side: Side,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            mods_dir: PathBuf::from("mods"),
            manifest_extension: ".pw.toml".into(),
            ephemeral_keys: vec![
                "x-prismlauncher-loaders".into(),
                "x-prismlauncher-mc-versions".into(),
                "x-prismlauncher-release-type".into(),
            ],
            client_patch_file: PathBuf::from("client_patch.txt"),
            server_blacklist_file: PathBuf::from("server_blacklist.txt"),
            sanitize_dirs: vec![PathBuf::from("resourcepacks"), PathBuf::from("shaderpacks")],
            archive_extension: ".zip".into(),
            unknown_mods_dir: PathBuf::from("unknown-mods"),
            unknown_mods_url_base: String::new(),
            unknown_mods_hash_format: HashFormat::Sha256,
            unknown_mods: Vec::new(),
            pack_file: PathBuf::from("pack.toml"),
            signature_file: PathBuf::from("unsup.sig"),
            signing_key: PathBuf::from("sig/pack.sec"),
            packaging_command: vec!["packwiz".into(), "refresh".into()],
            signing_program: "signify".into(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("failed to parse config {}", path.display()))
    }

    pub fn discover(root: &Path) -> Result<Self> {
        let candidate = root.join(CONFIG_FILE_NAME);
        let cfg = if candidate.is_file() {
            Self::load(&candidate)?
        } else {
            Self::default()
        };
        Ok(cfg.rebase(root))
    }

    pub fn rebase(mut self, base: &Path) -> Self {
        self.root = if self.root == Path::new(".") {
            base.to_path_buf()
        } else {
            base.join(&self.root)
        };
        self
    }

    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    pub fn mods_path(&self) -> PathBuf {
        self.resolve(&self.mods_dir)
    }

    pub fn client_patch_path(&self) -> PathBuf {
        self.resolve(&self.client_patch_file)
    }

    pub fn server_blacklist_path(&self) -> PathBuf {
        self.resolve(&self.server_blacklist_file)
    }

    pub fn unknown_mods_path(&self) -> PathBuf {
        self.resolve(&self.unknown_mods_dir)
    }

    pub fn sanitize_paths(&self) -> Vec<PathBuf> {
        self.sanitize_dirs.iter().map(|d| self.resolve(d)).collect()
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }
}
