use tracing::{error, info};

use crate::config::Config;
use crate::error::ManifestError;
use crate::task::check::{CheckReport, run_check};
use crate::task::sanitize::{SanitizeReport, run_sanitize};
use crate::task::side::{SideReport, run_update_sides};
use crate::task::strip::{StripReport, run_strip};
use crate::task::unknown::{GenerateReport, run_generate};
use crate::task::urls::{UrlReport, run_fix_urls};

#[derive(Debug, Default)]
pub struct PipelineReport {
    pub generate: Option<GenerateReport>,
    pub strip: Option<StripReport>,
    pub urls: Option<UrlReport>,
    pub sides: Option<SideReport>,
    pub check: Option<CheckReport>,
    pub sanitize: SanitizeReport,
}

impl PipelineReport {
    pub fn is_clean(&self) -> bool {
        self.generate.is_some()
            && self.strip.is_some()
            && self.urls.is_some()
            && self.sides.is_some()
            && self.check.as_ref().is_some_and(|c| c.errors() == 0)
    }
}

fn stage<T>(name: &str, result: Result<T, ManifestError>) -> Option<T> {
    match result {
        Ok(report) => Some(report),
        Err(e) => {
            error!(pass = name, error = %e, "pass skipped");
            None
        }
    }
}

pub fn run_pipeline(cfg: &Config) -> PipelineReport {
    info!(mods = %cfg.mods_path().display(), "running manifest pipeline");
    let report = PipelineReport {
        generate: stage("generate", run_generate(cfg)),
        strip: stage("strip", run_strip(cfg)),
        urls: stage("fix-urls", run_fix_urls(cfg)),
        sides: stage("sides", run_update_sides(cfg)),
        check: stage("check", run_check(cfg)),
        sanitize: run_sanitize(cfg),
    };
    info!(clean = report.is_clean(), "manifest pipeline finished");
    report
}
