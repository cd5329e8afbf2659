use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, fmt};

fn main() -> anyhow::Result<ExitCode> {
    // Initialize logging with RUST_LOG override, default to info
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = packwiz_prep::cli::Cli::parse();
    packwiz_prep::run(cli)
}
