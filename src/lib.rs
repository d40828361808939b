// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod marker;
pub mod report;
pub mod shutdown;
pub mod types;
pub mod watch;

use std::sync::Arc;

use tracing::info;

use crate::cli::CliArgs;
use crate::config::LoopConfig;
use crate::engine::{ExitReason, RerunLoop};
use crate::errors::Result;
use crate::exec::reload::{self, Invocation};
use crate::exec::RealCommandRunner;
use crate::fs::{FileSystem, RealFileSystem};
use crate::marker::MarkerGuard;
use crate::report::Reporter;

/// High-level entry point used by `main.rs`. Returns the process exit code.
///
/// This wires together:
/// - config resolution
/// - signal handling
/// - marker files
/// - the poll loop
/// - self-reload once the loop has released its markers
pub async fn run(args: CliArgs) -> Result<i32> {
    let config = LoopConfig::try_from(args)?;

    // Handlers go in first so a signal can never skip marker cleanup.
    let shutdown = shutdown::install_shutdown_handler()?;

    let invocation = if config.self_reload() {
        Some(Invocation::current()?)
    } else {
        None
    };

    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let markers = MarkerGuard::create(fs, &config.check_dir, std::process::id())?;
    let reporter = Reporter::stdout(config.clear_screen);

    let rerun = RerunLoop::new(config, markers, RealCommandRunner, reporter)?;
    let reason = rerun.run(shutdown).await;

    match reason {
        ExitReason::Once => Ok(0),
        ExitReason::Signal(signal) => {
            info!(?signal, "exiting on signal");
            Ok(signal.exit_code())
        }
        ExitReason::Reload => match invocation {
            Some(invocation) => reload::restart(&invocation),
            None => Ok(0),
        },
    }
}
