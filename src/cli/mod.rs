//! Command-line interface definitions.
//!
//! Defines the CLI structure for the roundcast binary using `clap`.

pub mod check;
pub mod output;
pub mod replay;
pub mod run;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Live round tracking and outcome prediction
#[derive(Parser, Debug)]
#[command(name = "roundcast")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, default_value = "config.toml")]
    pub config: PathBuf,

    /// Override log level (debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Use JSON log format instead of pretty
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Poll the live feed and keep predictions current (foreground)
    Run,

    /// Run diagnostic checks
    #[command(subcommand)]
    Check(CheckCommand),

    /// Rebuild statistics from the round archive and print the merged view
    Replay(ReplayArgs),
}

/// Subcommands for `roundcast check`.
#[derive(Subcommand, Debug)]
pub enum CheckCommand {
    /// Validate configuration file
    Config,
    /// Fetch the live feed once
    Feed,
}

/// Arguments for the `replay` subcommand.
#[derive(Parser, Debug)]
pub struct ReplayArgs {
    /// Maximum rows printed from the merged view
    #[arg(short = 'n', long, default_value = "20")]
    pub limit: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "roundcast",
            "check",
            "config",
            "--config",
            "alt.toml",
            "--json",
        ])
        .unwrap();
        assert_eq!(cli.config, PathBuf::from("alt.toml"));
        assert!(cli.json);
        assert!(matches!(cli.command, Commands::Check(CheckCommand::Config)));
    }

    #[test]
    fn replay_limit_defaults() {
        let cli = Cli::try_parse_from(["roundcast", "replay"]).unwrap();
        let Commands::Replay(args) = cli.command else {
            panic!("expected replay");
        };
        assert_eq!(args.limit, 20);
        assert_eq!(cli.config, PathBuf::from("config.toml"));
    }
}
