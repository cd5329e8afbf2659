use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use toml::Value;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::ManifestError;
use crate::metadata::document::{ManifestFile, identity_of};
use crate::metadata::modfile::{DownloadMode, HashFormat};
use crate::metadata::side::Side;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum UrlDefect {
    Space,
    OpenBracket,
    CloseBracket,
}

impl UrlDefect {
    fn describe(self) -> &'static str {
        match self {
            UrlDefect::Space => "unencoded spaces",
            UrlDefect::OpenBracket => "unencoded '['",
            UrlDefect::CloseBracket => "unencoded ']'",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Issue {
    Unreadable { message: String },
    ParseFailure { message: String },
    MissingSection { section: String },
    MissingKey { section: String, key: String },
    EmptyUrl,
    MalformedUrl { defect: UrlDefect },
    InvalidValue { key: String, value: String },
    SuspiciousLine { line: usize, text: String },
}

impl Issue {
    pub fn severity(&self) -> Severity {
        match self {
            Issue::Unreadable { .. }
            | Issue::ParseFailure { .. }
            | Issue::MissingSection { .. }
            | Issue::MissingKey { .. }
            | Issue::EmptyUrl => Severity::Error,
            Issue::MalformedUrl { .. }
            | Issue::InvalidValue { .. }
            | Issue::SuspiciousLine { .. } => Severity::Warning,
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Issue::Unreadable { message } => write!(f, "could not read file: {message}"),
            Issue::ParseFailure { message } => write!(f, "could not parse TOML: {message}"),
            Issue::MissingSection { section } => write!(f, "missing section '[{section}]'"),
            Issue::MissingKey { section, key } => {
                write!(f, "missing key '{key}' in section '[{section}]'")
            }
            Issue::EmptyUrl => f.write_str("download.url is empty or not a string"),
            Issue::MalformedUrl { defect } => {
                write!(f, "malformed url, contains {}", defect.describe())
            }
            Issue::InvalidValue { key, value } => write!(f, "invalid value {value} for '{key}'"),
            Issue::SuspiciousLine { line, text } => {
                write!(f, "suspicious line {line} may be missing '=': {text}")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub identity: String,
    pub path: PathBuf,
    pub severity: Severity,
    #[serde(flatten)]
    pub issue: Issue,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    pub checked: usize,
    pub findings: Vec<Finding>,
}

impl CheckReport {
    pub fn errors(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warnings(&self) -> usize {
        self.count(Severity::Warning)
    }

    fn count(&self, severity: Severity) -> usize {
        self.findings.iter().filter(|f| f.severity == severity).count()
    }
}

fn suspicious_line(text: &str) -> Option<Issue> {
    text.lines().enumerate().find_map(|(i, line)| {
        (line.contains('\'') && !line.contains('=') && !line.contains("mc-versions")).then(|| {
            Issue::SuspiciousLine {
                line: i + 1,
                text: line.trim().to_string(),
            }
        })
    })
}

fn missing_required(manifest: &ManifestFile) -> Option<Issue> {
    let Some(download) = manifest.table.get("download") else {
        return Some(Issue::MissingSection {
            section: "download".into(),
        });
    };
    match download.get("url") {
        None => Some(Issue::MissingKey {
            section: "download".into(),
            key: "url".into(),
        }),
        Some(url) if url.as_str().is_none_or(str::is_empty) => Some(Issue::EmptyUrl),
        Some(_) => None,
    }
}

fn url_defects(url: &str) -> Vec<Issue> {
    [
        (' ', UrlDefect::Space),
        ('[', UrlDefect::OpenBracket),
        (']', UrlDefect::CloseBracket),
    ]
    .into_iter()
    .filter(|(c, _)| url.contains(*c))
    .map(|(_, defect)| Issue::MalformedUrl { defect })
    .collect()
}

fn invalid_values(manifest: &ManifestFile) -> Vec<Issue> {
    fn check<T: serde::de::DeserializeOwned>(key: &str, value: Option<&Value>) -> Option<Issue> {
        let value = value?;
        value.clone().try_into::<T>().err().map(|_| Issue::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        })
    }

    let download = manifest.download();
    [
        check::<Side>("side", manifest.table.get("side")),
        check::<HashFormat>("download.hash-format", download.and_then(|d| d.get("hash-format"))),
        check::<DownloadMode>("download.mode", download.and_then(|d| d.get("mode"))),
    ]
    .into_iter()
    .flatten()
    .collect()
}

pub fn check_text(path: &Path, extension: &str, text: &str) -> Vec<Issue> {
    let mut issues: Vec<Issue> = suspicious_line(text).into_iter().collect();

    let manifest = match ManifestFile::parse(path, extension, text) {
        Ok(m) => m,
        Err(ManifestError::Parse { source, .. }) => {
            issues.push(Issue::ParseFailure {
                message: source.message().to_string(),
            });
            return issues;
        }
        Err(e) => {
            issues.push(Issue::ParseFailure {
                message: e.to_string(),
            });
            return issues;
        }
    };

    if let Some(issue) = missing_required(&manifest) {
        issues.push(issue);
        return issues;
    }
    if let Some(url) = manifest.download_url() {
        issues.extend(url_defects(url));
    }
    issues.extend(invalid_values(&manifest));
    issues
}

pub fn run_check(cfg: &Config) -> Result<CheckReport, ManifestError> {
    let files = crate::list_files_with_suffix(&cfg.mods_path(), &cfg.manifest_extension)?;
    let mut report = CheckReport::default();

    for path in files {
        debug!(path = %path.display(), "checking");
        let issues = match std::fs::read_to_string(&path) {
            Ok(text) => check_text(&path, &cfg.manifest_extension, &text),
            Err(e) => vec![Issue::Unreadable {
                message: e.to_string(),
            }],
        };
        report.checked += 1;

        let identity = identity_of(&path, &cfg.manifest_extension);
        for issue in issues {
            let severity = issue.severity();
            match severity {
                Severity::Error => error!(path = %path.display(), "{issue}"),
                Severity::Warning => warn!(path = %path.display(), "{issue}"),
            }
            report.findings.push(Finding {
                identity: identity.clone(),
                path: path.clone(),
                severity,
                issue,
            });
        }
    }

    info!(
        checked = report.checked,
        errors = report.errors(),
        warnings = report.warnings(),
        "finished checking manifests"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(text: &str) -> Vec<Issue> {
        check_text(Path::new("m.pw.toml"), ".pw.toml", text)
    }

    #[test]
    fn missing_download_section() {
        assert_eq!(
            check("filename = \"a.jar\"\nside = \"both\"\n"),
            vec![Issue::MissingSection {
                section: "download".into()
            }]
        );
    }

    #[test]
    fn missing_url_key() {
        assert_eq!(
            check("filename = \"a.jar\"\n[download]\nhash = \"00\"\n"),
            vec![Issue::MissingKey {
                section: "download".into(),
                key: "url".into()
            }]
        );
    }

    #[test]
    fn empty_url_is_an_error() {
        let issues = check("[download]\nurl = \"\"\n");
        assert_eq!(issues, vec![Issue::EmptyUrl]);
        assert_eq!(issues[0].severity(), Severity::Error);
    }

    #[test]
    fn each_url_defect_is_reported_once() {
        let issues = check("[download]\nurl = \"https://host/a b [c] d.jar\"\n");
        assert_eq!(
            issues,
            vec![
                Issue::MalformedUrl {
                    defect: UrlDefect::Space
                },
                Issue::MalformedUrl {
                    defect: UrlDefect::OpenBracket
                },
                Issue::MalformedUrl {
                    defect: UrlDefect::CloseBracket
                },
            ]
        );
    }

    #[test]
    fn parse_failure_stops_further_checks() {
        let issues = check("side = \n[download\n");
        assert_eq!(issues.len(), 1);
        assert!(matches!(issues[0], Issue::ParseFailure { .. }));
    }

    #[test]
    fn flags_values_outside_the_schema() {
        let issues = check(
            "side = \"everywhere\"\n[download]\nurl = \"https://host/a.jar\"\nhash-format = \"crc32\"\nmode = \"url\"\n",
        );
        assert_eq!(issues.len(), 2);
        assert!(issues.iter().all(|i| i.severity() == Severity::Warning));
        assert!(issues.contains(&Issue::InvalidValue {
            key: "side".into(),
            value: "\"everywhere\"".into()
        }));
    }

    #[test]
    fn suspicious_quote_line_is_reported_even_if_unparseable() {
        let issues = check("name = \"A\"\n'oops'\n[download]\nurl = \"https://host/a.jar\"\n");
        assert_eq!(
            issues[0],
            Issue::SuspiciousLine {
                line: 2,
                text: "'oops'".into()
            }
        );
        assert!(matches!(issues[1], Issue::ParseFailure { .. }));
    }

    #[test]
    fn reports_every_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let mods = dir.path().join("mods");
        std::fs::create_dir(&mods).unwrap();
        std::fs::write(mods.join("a.pw.toml"), "filename = \"a.jar\"\nside = \"both\"\n").unwrap();
        std::fs::write(
            mods.join("b.pw.toml"),
            "filename = \"b.jar\"\nside = \"both\"\n[download]\nhash = \"00\"\n",
        )
        .unwrap();
        std::fs::write(
            mods.join("c.pw.toml"),
            "filename = \"c.jar\"\nside = \"both\"\n[download]\nurl = \"https://host/c d.jar\"\n",
        )
        .unwrap();

        let report = run_check(&Config::with_root(dir.path())).unwrap();
        assert_eq!(report.checked, 3);
        assert_eq!(report.errors(), 2);
        assert_eq!(report.warnings(), 1);
        let malformed: Vec<_> = report
            .findings
            .iter()
            .filter(|f| matches!(f.issue, Issue::MalformedUrl { .. }))
            .collect();
        assert_eq!(malformed.len(), 1);
        assert_eq!(malformed[0].identity, "c");
    }

    #[test]
    fn broken_manifest_is_a_finding_not_an_abort() {
        let dir = tempfile::tempdir().unwrap();
        let mods = dir.path().join("mods");
        std::fs::create_dir(&mods).unwrap();
        let good = "filename = \"a.jar\"\nside = \"both\"\n[download]\nurl = \"https://host/a.jar\"\n";
        std::fs::write(mods.join("a.pw.toml"), good).unwrap();
        std::fs::write(mods.join("b.pw.toml"), "side = \n[download\n").unwrap();
        std::fs::write(mods.join("c.pw.toml"), good).unwrap();

        let report = run_check(&Config::with_root(dir.path())).unwrap();
        assert_eq!(report.checked, 3);
        assert_eq!(report.findings.len(), 1);
        assert_eq!(report.findings[0].identity, "b");
        assert!(matches!(report.findings[0].issue, Issue::ParseFailure { .. }));
    }

    #[test]
    fn findings_serialize_with_kind_tag() {
        let finding = Finding {
            identity: "a".into(),
            path: PathBuf::from("mods/a.pw.toml"),
            severity: Severity::Warning,
            issue: Issue::MalformedUrl {
                defect: UrlDefect::OpenBracket,
            },
        };
        let json = serde_json::to_value(&finding).unwrap();
        assert_eq!(json["kind"], "malformed-url");
        assert_eq!(json["defect"], "open-bracket");
        assert_eq!(json["severity"], "warning");
    }
}
