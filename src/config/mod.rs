// src/config/mod.rs

//! Runtime configuration for the rerun loop.
//!
//! There is no configuration file: everything comes from the command line
//! and the `CHECKDIR` environment variable (see [`crate::cli`]). This module
//! turns the raw CLI arguments into a validated, immutable [`LoopConfig`].

pub mod validate;

use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

use crate::cli::CliArgs;
use crate::errors::{RerunError, Result};
use crate::exec::CommandSpec;
use crate::types::{ShellMode, DEFAULT_EXCLUDED_SUFFIXES};

pub use validate::validate_config;

/// Everything the loop needs to know, resolved and validated.
#[derive(Debug, Clone, PartialEq)]
pub struct LoopConfig {
    pub command: CommandSpec,
    pub interval: Duration,
    pub excluded_suffixes: Vec<String>,
    /// Scratch directory holding the marker files.
    pub check_dir: PathBuf,
    pub watch_dir: PathBuf,
    /// File watched for self-reload; `None` disables self-reload.
    pub self_path: Option<PathBuf>,
    pub clear_screen: bool,
    /// Stop after a single cycle.
    pub once: bool,
}

impl LoopConfig {
    pub fn self_reload(&self) -> bool {
        self.self_path.is_some()
    }
}

impl TryFrom<CliArgs> for LoopConfig {
    type Error = RerunError;

    fn try_from(args: CliArgs) -> Result<Self> {
        let interval = Duration::try_from_secs_f64(args.interval).map_err(|_| {
            RerunError::ConfigError(format!("invalid --interval: {}", args.interval))
        })?;

        let excluded_suffixes = if args.exclude_suffixes.is_empty() {
            DEFAULT_EXCLUDED_SUFFIXES.iter().map(|s| s.to_string()).collect()
        } else {
            args.exclude_suffixes
        };

        let self_path = if args.no_self_reload {
            None
        } else {
            match args.self_path {
                Some(path) => Some(path),
                None => match std::env::current_exe() {
                    Ok(exe) => Some(exe),
                    Err(err) => {
                        warn!(error = %err, "cannot locate own binary; self-reload disabled");
                        None
                    }
                },
            }
        };

        let mode = if args.no_shell {
            ShellMode::Direct
        } else {
            ShellMode::Shell
        };

        let config = LoopConfig {
            command: CommandSpec::new(args.command, mode),
            interval,
            excluded_suffixes,
            check_dir: args.check_dir.unwrap_or_else(std::env::temp_dir),
            watch_dir: args.watch_dir,
            self_path,
            clear_screen: !args.no_clear,
            once: args.once,
        };

        validate_config(&config)?;
        Ok(config)
    }
}
