// src/config/validate.rs

use crate::config::LoopConfig;
use crate::errors::{RerunError, Result};
use crate::watch::WatchFilter;

/// Check invariants `clap` cannot express.
///
/// - the command vector is non-empty
/// - the poll interval is positive
/// - the excluded suffixes compile into a filter
/// - the watch root is a directory
pub fn validate_config(config: &LoopConfig) -> Result<()> {
    if config.command.argv().is_empty() {
        return Err(RerunError::ConfigError("no command given".to_string()));
    }

    if config.interval.is_zero() {
        return Err(RerunError::ConfigError(
            "--interval must be greater than zero".to_string(),
        ));
    }

    WatchFilter::new(&config.excluded_suffixes)
        .map_err(|e| RerunError::ConfigError(format!("{e:#}")))?;

    if !config.watch_dir.is_dir() {
        return Err(RerunError::ConfigError(format!(
            "watch directory {:?} is not a directory",
            config.watch_dir
        )));
    }

    Ok(())
}
