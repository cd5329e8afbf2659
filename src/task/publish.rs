use std::path::PathBuf;
use std::process::Command;

use tracing::info;

use crate::config::Config;
use crate::error::ManifestError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalTool {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

impl ExternalTool {
    pub fn run(&self) -> Result<(), ManifestError> {
        info!(program = %self.program, args = ?self.args, "running external tool");
        let status = Command::new(&self.program)
            .args(&self.args)
            .current_dir(&self.cwd)
            .status()
            .map_err(|e| ManifestError::Tool {
                program: self.program.clone(),
                reason: e.to_string(),
            })?;
        if !status.success() {
            return Err(ManifestError::Tool {
                program: self.program.clone(),
                reason: status.to_string(),
            });
        }
        Ok(())
    }
}

pub fn packaging_tool(cfg: &Config) -> Result<ExternalTool, ManifestError> {
    let (program, args) = cfg
        .packaging_command
        .split_first()
        .ok_or_else(|| ManifestError::Tool {
            program: "<packaging>".into(),
            reason: "packaging-command is empty".into(),
        })?;
    Ok(ExternalTool {
        program: program.clone(),
        args: args.to_vec(),
        cwd: cfg.root.clone(),
    })
}

pub fn signing_tool(cfg: &Config) -> ExternalTool {
    let arg = |p: &PathBuf| p.to_string_lossy().into_owned();
    ExternalTool {
        program: cfg.signing_program.clone(),
        args: vec![
            "-S".into(),
            "-s".into(),
            arg(&cfg.signing_key),
            "-m".into(),
            arg(&cfg.pack_file),
            "-x".into(),
            arg(&cfg.signature_file),
        ],
        cwd: cfg.root.clone(),
    }
}

pub fn package(cfg: &Config) -> Result<(), ManifestError> {
    packaging_tool(cfg)?.run()
}

pub fn sign(cfg: &Config) -> Result<(), ManifestError> {
    let sig = cfg.resolve(&cfg.signature_file);
    match std::fs::remove_file(&sig) {
        Ok(()) => info!(path = %sig.display(), "removed existing signature"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(ManifestError::io(&sig, e)),
    }
    signing_tool(cfg).run()?;
    info!(pack = %cfg.pack_file.display(), signature = %sig.display(), "signed pack");
    Ok(())
}

pub fn publish(cfg: &Config) -> Result<(), ManifestError> {
    package(cfg)?;
    sign(cfg)
}
