pub mod config;
pub mod monitor;
pub mod windows;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "craft-monitor",
    version,
    about = "Watches a screen region with OCR and alerts when a desired crafting outcome appears"
)]
pub struct Cli {
    /// Path to config.json (default: ./config.json, then the platform config dir)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging (logs the full OCR text each poll)
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Run the monitor until interrupted (default)
    Run,
    /// Validate the config and probe the OCR engine
    Check,
    /// List windows with their rectangles
    Windows,
    /// Write a starter config
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults_to_run() {
        let cli = Cli::parse_from(["craft-monitor"]);
        assert_eq!(cli.command, None);
        assert_eq!(cli.config, None);
        assert!(!cli.debug);
        assert_eq!(cli.log_format, LogFormat::Text);
    }

    #[test]
    fn test_cli_config_flag() {
        let cli = Cli::parse_from(["craft-monitor", "--config", "my.json", "-d"]);
        assert_eq!(cli.config, Some(PathBuf::from("my.json")));
        assert!(cli.debug);
    }

    #[test]
    fn test_cli_subcommands() {
        let cli = Cli::parse_from(["craft-monitor", "check", "-c", "x.json"]);
        assert_eq!(cli.command, Some(Command::Check));
        assert_eq!(cli.config, Some(PathBuf::from("x.json")));

        let cli = Cli::parse_from(["craft-monitor", "init", "--force"]);
        assert_eq!(cli.command, Some(Command::Init { force: true }));

        let cli = Cli::parse_from(["craft-monitor", "--log-format", "json", "windows"]);
        assert_eq!(cli.command, Some(Command::Windows));
        assert_eq!(cli.log_format, LogFormat::Json);
    }

    #[test]
    fn test_cli_verify() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
