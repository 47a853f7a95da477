//! Build an AWS Encryption SDK decrypt message generation manifest
//!
//! The manifest goes to stdout; logs go to stderr.

use std::io::{self, Write};

use anyhow::Context;
use clap::Parser;
use tracing::debug;

use awses_manifest::config::Cli;
use awses_manifest::{GenerateConfig, render};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = awses_logging::init_cli(cli.verbose, cli.log_file.clone());

    let config = GenerateConfig::from(&cli);
    debug!(?config, "generating manifest");

    let json = render(&config)
        .with_context(|| format!("failed to build manifest from {}", config.keys.display()))?;

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{json}")?;
    stdout.flush()?;
    Ok(())
}
