//! `quire build` command implementation.

use std::path::PathBuf;

use clap::Args;
use quire_build::{BuildConfig, StaticSiteBuilder};
use quire_config::{CliSettings, Config};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    /// Vault directory to read (overrides config).
    #[arg(short, long, env = "QUIRE_INPUT")]
    pub input: Option<PathBuf>,

    /// Output directory, removed and recreated on every build (overrides config).
    #[arg(short, long, env = "QUIRE_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Site title appended to every browser title (overrides config).
    #[arg(short, long)]
    pub title: Option<String>,

    /// Path to configuration file (default: auto-discover quire.toml).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose output (info-level logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl BuildArgs {
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        let cli_settings = CliSettings {
            source_dir: self.input,
            output_dir: self.output,
            site_title: self.title,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        tracing::debug!(config_path = ?config.config_path, "Loaded configuration");
        let build_config = BuildConfig::from_config(&config);

        output.info(&format!("Source: {}", build_config.source_dir.display()));
        output.info(&format!("Output: {}", build_config.output_dir.display()));

        let output_dir = build_config.output_dir.clone();
        let summary = StaticSiteBuilder::new(build_config).build()?;

        output.success(&format!(
            "Built {} pages and copied {} assets to {}",
            summary.pages,
            summary.assets,
            output_dir.display()
        ));
        Ok(())
    }
}
