//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Configuration file used when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "cefpost.toml";

/// cefpost -- Common Event Format (CEF) log line parser.
///
/// Use `cefpost <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "cefpost", version, about, long_about = None)]
pub struct Cli {
    /// Path to the cefpost.toml configuration file [default: cefpost.toml].
    ///
    /// A missing default file falls back to built-in defaults; an explicitly
    /// given file must exist.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    /// Override the timezone applied to syslog timestamps (IANA name or +HH:MM).
    #[arg(long, global = true)]
    pub timezone: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse CEF lines from a file or stdin.
    Parse(ParseArgs),

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- parse ----

/// Parse CEF lines and print one record per line.
#[derive(Args, Debug)]
pub struct ParseArgs {
    /// File to read (default: stdin).
    pub file: Option<PathBuf>,

    /// Stop at the first line that fails to parse.
    #[arg(long)]
    pub fail_fast: bool,
}

// ---- config ----

/// Manage cefpost configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, parser).
        #[arg(long)]
        section: Option<String>,
    },
}
