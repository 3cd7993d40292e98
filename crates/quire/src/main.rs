//! Quire CLI - static site generator for note vaults.
//!
//! Provides commands for:
//! - `build`: Render a vault into a static HTML site

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::BuildArgs;
use output::Output;

/// Quire - static site generator for note vaults.
#[derive(Parser)]
#[command(name = "quire", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the static site (clean build).
    Build(BuildArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    let verbose = match &cli.command {
        Commands::Build(args) => args.verbose,
    };

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Build(args) => args.execute(&output),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_build_flags() {
        let cli = Cli::try_parse_from([
            "quire", "build", "-i", "vault", "-o", "public", "-t", "My Notes", "--verbose",
        ])
        .unwrap();

        let Commands::Build(args) = cli.command;
        assert_eq!(args.input, Some(PathBuf::from("vault")));
        assert_eq!(args.output, Some(PathBuf::from("public")));
        assert_eq!(args.title.as_deref(), Some("My Notes"));
        assert!(args.verbose);
        assert_eq!(args.config, None);
    }

    #[test]
    fn test_parse_build_defaults() {
        let cli = Cli::try_parse_from(["quire", "build"]).unwrap();

        let Commands::Build(args) = cli.command;
        assert_eq!(args.input, None);
        assert_eq!(args.output, None);
        assert_eq!(args.title, None);
        assert!(!args.verbose);
    }

    #[test]
    fn test_build_requires_subcommand() {
        assert!(Cli::try_parse_from(["quire"]).is_err());
    }
}
