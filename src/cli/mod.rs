//! CLI module for content-chain
//!
//! Provides subcommands:
//! - `run`: execute a chain script against a simulated connectivity timeline

pub mod run;

use clap::{Parser, Subcommand};

/// content-chain - sequential, connectivity-aware content loading
#[derive(Parser)]
#[command(name = "content-chain")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run a chain script and print its outcome
    Run(run::RunArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_parse_run_command() {
        let cli = Cli::try_parse_from(["content-chain", "run", "chain.toml", "--timeout-ms", "250"])
            .unwrap();

        let Command::Run(args) = cli.command;
        assert_eq!(args.script, PathBuf::from("chain.toml"));
        assert_eq!(args.timeout_ms, Some(250));
    }

    #[test]
    fn test_script_is_required() {
        assert!(Cli::try_parse_from(["content-chain", "run"]).is_err());
    }
}
