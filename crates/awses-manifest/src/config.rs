use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Which manifest to generate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ManifestType {
    /// Decrypt-generation manifest (`awses-decrypt-generate`, version 2)
    #[default]
    DecryptGenerate,
    /// Encrypt manifest (`awses-encrypt`, version 1)
    Encrypt,
}

/// Library-facing generation settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateConfig {
    pub keys: PathBuf,
    pub human: bool,
    pub manifest_type: ManifestType,
}

impl GenerateConfig {
    pub fn new(keys: impl Into<PathBuf>) -> Self {
        Self {
            keys: keys.into(),
            human: false,
            manifest_type: ManifestType::default(),
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "awses-decrypt-generate",
    about = "Build an AWS Encryption SDK decrypt message generation manifest",
    version
)]
pub struct Cli {
    /// Keys manifest to use
    #[arg(long)]
    pub keys: PathBuf,

    /// Print human-readable JSON
    #[arg(long)]
    pub human: bool,

    /// Manifest to generate
    #[arg(long, value_enum, default_value_t = ManifestType::DecryptGenerate)]
    pub manifest_type: ManifestType,

    /// Enable verbose logging (stderr)
    #[arg(short, long)]
    pub verbose: bool,

    /// Also write JSONL logs into this directory
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl From<&Cli> for GenerateConfig {
    fn from(cli: &Cli) -> Self {
        Self {
            keys: cli.keys.clone(),
            human: cli.human,
            manifest_type: cli.manifest_type,
        }
    }
}
