// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `rerun`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "rerun",
    version,
    about = "Re-run a command whenever files under the current directory change.",
    long_about = None
)]
pub struct CliArgs {
    /// Seconds to sleep between polls.
    #[arg(long, value_name = "SECS", default_value_t = 2.0)]
    pub interval: f64,

    /// File-name suffix to ignore (repeatable). Replaces the default
    /// `.pyc` / `.pyo` set.
    #[arg(long = "exclude-suffix", value_name = "SUFFIX")]
    pub exclude_suffixes: Vec<String>,

    /// Directory for the marker files.
    ///
    /// Default: the system temp directory.
    #[arg(long, value_name = "DIR", env = "CHECKDIR")]
    pub check_dir: Option<PathBuf>,

    /// Root of the watched tree.
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub watch_dir: PathBuf,

    /// File whose modification triggers a self-reload.
    ///
    /// Default: the running `rerun` binary.
    #[arg(long, value_name = "PATH")]
    pub self_path: Option<PathBuf>,

    /// Never restart when the program itself changes.
    #[arg(long)]
    pub no_self_reload: bool,

    /// Run the command directly instead of through `sh -c`.
    #[arg(long)]
    pub no_shell: bool,

    /// Don't clear the terminal before each run.
    #[arg(long)]
    pub no_clear: bool,

    /// Run a single poll cycle and exit.
    #[arg(long)]
    pub once: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `RERUN_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// The command to run on every change.
    #[arg(
        required = true,
        trailing_var_arg = true,
        allow_hyphen_values = true,
        value_name = "COMMAND"
    )]
    pub command: Vec<String>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
