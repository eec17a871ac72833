//! CLI interface using clap
//!
//! Provides the command-line interface for tutorlint

mod commands;

pub use commands::*;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// tutorlint - Structural consistency checker for Markdown tutorials
#[derive(Parser, Debug)]
#[command(name = "tutorlint")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json)
    #[arg(short = 'o', long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Configuration file (defaults to .tutorlint.toml in the current directory)
    #[arg(short, long, global = true, env = "TUTORLINT_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate documents and report findings
    Check(CheckArgs),

    /// Print the table of contents of a document
    Toc(TocArgs),

    /// List the code blocks of a document
    Blocks(BlocksArgs),

    /// Show or initialize configuration
    Config(ConfigArgs),

    /// Watch for changes and check automatically
    Watch(WatchArgs),
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Arguments for check command
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Documents or directories to check
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Escalate warnings to errors
    #[arg(short, long)]
    pub strict: bool,

    /// Number of documents validated in parallel
    #[arg(short, long)]
    pub jobs: Option<usize>,
}

/// Arguments for toc command
#[derive(Parser, Debug)]
pub struct TocArgs {
    /// Document to read
    pub path: PathBuf,
}

/// Arguments for blocks command
#[derive(Parser, Debug)]
pub struct BlocksArgs {
    /// Document to read
    pub path: PathBuf,

    /// Only list blocks with this language tag
    #[arg(short, long)]
    pub language: Option<String>,
}

/// Arguments for config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Show current configuration
    #[arg(long)]
    pub show: bool,

    /// Write the default configuration to .tutorlint.toml
    #[arg(long)]
    pub init: bool,

    /// Overwrite an existing file with --init
    #[arg(short, long)]
    pub force: bool,

    /// Get a configuration value
    #[arg(long)]
    pub get: Option<String>,
}

/// Arguments for watch command
#[derive(Parser, Debug)]
pub struct WatchArgs {
    /// Documents or directories to watch
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Escalate warnings to errors
    #[arg(short, long)]
    pub strict: bool,

    /// Debounce interval in milliseconds
    #[arg(short, long, default_value = "500")]
    pub debounce: u64,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_parsing() {
        let cli = Cli::parse_from(["tutorlint", "check", "--strict", "-j", "4", "docs", "README.md"]);
        let Commands::Check(args) = cli.command else {
            panic!("expected check command");
        };
        assert!(args.strict);
        assert_eq!(args.jobs, Some(4));
        assert_eq!(args.paths, vec![PathBuf::from("docs"), PathBuf::from("README.md")]);
    }

    #[test]
    fn test_check_requires_paths() {
        assert!(Cli::try_parse_from(["tutorlint", "check"]).is_err());
    }

    #[test]
    fn test_global_format() {
        let cli = Cli::parse_from(["tutorlint", "toc", "guide.md", "-o", "json"]);
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(matches!(cli.command, Commands::Toc(_)));
    }
}
