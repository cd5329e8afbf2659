use std::path::{Path, PathBuf};

use toml::{Table, Value};

use crate::error::ManifestError;

#[derive(Debug, Clone)]
pub struct ManifestFile {
    pub path: PathBuf,
    pub identity: String,
    pub table: Table,
}

impl ManifestFile {
    pub fn load(path: &Path, extension: &str) -> Result<Self, ManifestError> {
        let text = std::fs::read_to_string(path).map_err(|e| ManifestError::io(path, e))?;
        Self::parse(path, extension, &text)
    }

    pub fn parse(path: &Path, extension: &str, text: &str) -> Result<Self, ManifestError> {
        let table: Table = toml::from_str(text).map_err(|source| ManifestError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            identity: identity_of(path, extension),
            table,
        })
    }

    pub fn download(&self) -> Option<&Table> {
        self.table.get("download").and_then(Value::as_table)
    }

    pub fn download_url(&self) -> Option<&str> {
        self.download()?.get("url")?.as_str()
    }

    pub fn set_download_url(&mut self, url: String) -> bool {
        match self.table.get_mut("download").and_then(Value::as_table_mut) {
            Some(download) => {
                download.insert("url".into(), Value::String(url));
                true
            }
            None => false,
        }
    }

    pub fn side(&self) -> Option<&str> {
        self.table.get("side")?.as_str()
    }

    pub fn set_side(&mut self, side: &str) {
        self.table.insert("side".into(), Value::String(side.to_string()));
    }

    pub fn save(&self) -> Result<(), ManifestError> {
        let text = toml::to_string(&self.table).map_err(|source| ManifestError::Serialize {
            path: self.path.clone(),
            source,
        })?;
        crate::write_atomic(&self.path, text.as_bytes())
    }
}

pub fn identity_of(path: &Path, extension: &str) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match name.strip_suffix(extension) {
        Some(stem) => stem.to_string(),
        None => name,
    }
}
