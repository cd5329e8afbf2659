use std::path::Path;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use tracing::{error, info};
use url::Url;

use crate::config::Config;
use crate::error::ManifestError;
use crate::metadata::document::ManifestFile;

// `%` stays literal so existing escapes survive
const PATH_UNSAFE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'[')
    .add(b']')
    .add(b'{')
    .add(b'}')
    .add(b'|')
    .add(b'\\')
    .add(b'^');

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct UrlReport {
    pub processed: usize,
    pub fixed: usize,
    pub failed: usize,
}

fn path_span(url: &str) -> (usize, usize) {
    let mut start = 0;
    if let Some(colon) = url.find(':') {
        let scheme = &url[..colon];
        let valid = scheme.starts_with(|c: char| c.is_ascii_alphabetic())
            && scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
        if valid {
            start = colon + 1;
        }
    }
    if url[start..].starts_with("//") {
        let authority = start + 2;
        start = url[authority..]
            .find(['/', '?', '#'])
            .map_or(url.len(), |i| authority + i);
    }
    let end = url[start..]
        .find(['?', '#'])
        .map_or(url.len(), |i| start + i);
    (start, end)
}

pub fn normalize_url(url: &str) -> Result<String, ManifestError> {
    let (start, end) = path_span(url);
    let path = utf8_percent_encode(&url[start..end], PATH_UNSAFE).to_string();
    let corrected = format!("{}{}{}", &url[..start], path, &url[end..]);
    Url::parse(&corrected).map_err(|source| ManifestError::Url {
        url: url.to_string(),
        source,
    })?;
    Ok(corrected)
}

pub fn fix_file(path: &Path, extension: &str) -> Result<Option<String>, ManifestError> {
    let mut manifest = ManifestFile::load(path, extension)?;
    let Some(original) = manifest.download_url().map(str::to_owned) else {
        return Ok(None);
    };
    let corrected = normalize_url(&original)?;
    if corrected == original {
        return Ok(None);
    }
    manifest.set_download_url(corrected.clone());
    manifest.save()?;
    Ok(Some(corrected))
}

pub fn run_fix_urls(cfg: &Config) -> Result<UrlReport, ManifestError> {
    let files = crate::list_files_with_suffix(&cfg.mods_path(), &cfg.manifest_extension)?;
    let mut report = UrlReport::default();

    for path in files {
        match fix_file(&path, &cfg.manifest_extension) {
            Ok(fixed) => {
                report.processed += 1;
                if let Some(url) = fixed {
                    info!(path = %path.display(), %url, "fixed url");
                    report.fixed += 1;
                }
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "failed to fix url");
                report.failed += 1;
            }
        }
    }

    info!(
        processed = report.processed,
        fixed = report.fixed,
        "finished checking download urls"
    );
    Ok(report)
}
