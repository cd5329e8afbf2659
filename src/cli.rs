use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Text,
    Json,
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "packwiz-prep",
    version,
    about = "Prepare a packwiz modpack from a launcher instance export"
)]
pub struct Cli {
    /// Pack root that relative paths resolve against (defaults to the current dir)
    #[arg(long = "root", global = true)]
    pub root: Option<PathBuf>,

    /// Config file to use instead of packwiz-prep.toml in the pack root
    #[arg(long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Manifest directory, overriding the config file
    #[arg(long = "mods-dir", global = true)]
    pub mods_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Remove launcher-only keys from every manifest
    Strip,
    /// Percent-encode unsafe characters in download urls
    FixUrls,
    /// Apply the client patch list and the server blacklist
    Sides,
    /// Report missing keys and malformed urls
    Check {
        #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,

        /// Exit with a failure status if any error was found
        #[arg(long)]
        strict: bool,
    },
    /// Rename archives in the asset directories
    Sanitize,
    /// Write manifests for the configured local jars
    Generate,
    /// Run every pass in order
    Run {
        /// Package and sign the pack afterwards (only when the run is clean)
        #[arg(long)]
        publish: bool,

        /// Exit with a failure status unless the run is clean
        #[arg(long)]
        strict: bool,
    },
}
