use std::path::Path;

use tracing::{debug, error, info};

use crate::config::Config;
use crate::error::ManifestError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StripState {
    Scanning,
    SkippingArray,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StripReport {
    pub processed: usize,
    pub lines_removed: usize,
    pub failed: usize,
}

fn denylisted_value<'a>(line: &'a str, keys: &[String]) -> Option<&'a str> {
    let trimmed = line.trim_start();
    keys.iter().find_map(|key| {
        let rest = trimmed.strip_prefix(key.as_str())?;
        rest.trim_start().strip_prefix('=')
    })
}

fn opens_multiline_array(value: &str) -> bool {
    let value = value.trim_start();
    value.starts_with('[') && value.matches('[').count() > value.matches(']').count()
}

// An unterminated array swallows the rest of the input.
pub fn strip_text(text: &str, keys: &[String]) -> (String, usize) {
    let mut state = StripState::Scanning;
    let mut kept = String::with_capacity(text.len());
    let mut removed = 0;

    for line in text.split_inclusive('\n') {
        match state {
            StripState::SkippingArray => {
                removed += 1;
                if line.contains(']') {
                    state = StripState::Scanning;
                }
            }
            StripState::Scanning => match denylisted_value(line, keys) {
                Some(value) => {
                    removed += 1;
                    if opens_multiline_array(value) {
                        state = StripState::SkippingArray;
                    }
                }
                None => kept.push_str(line),
            },
        }
    }

    (kept, removed)
}

pub fn strip_file(path: &Path, keys: &[String]) -> Result<usize, ManifestError> {
    let text = std::fs::read_to_string(path).map_err(|e| ManifestError::io(path, e))?;
    let (kept, removed) = strip_text(&text, keys);
    crate::write_atomic(path, kept.as_bytes())?;
    Ok(removed)
}

pub fn run_strip(cfg: &Config) -> Result<StripReport, ManifestError> {
    let mods = cfg.mods_path();
    let files = crate::list_files_with_suffix(&mods, &cfg.manifest_extension)?;
    let mut report = StripReport::default();

    for path in files {
        debug!(path = %path.display(), "stripping");
        match strip_file(&path, &cfg.ephemeral_keys) {
            Ok(removed) => {
                report.processed += 1;
                report.lines_removed += removed;
            }
            Err(e) => {
                error!(error = %e, "failed to strip manifest");
                report.failed += 1;
            }
        }
    }

    info!(
        processed = report.processed,
        lines_removed = report.lines_removed,
        "stripped launcher keys from manifests"
    );
    Ok(report)
}
