// src/engine/runtime.rs

use std::fmt;

use chrono::Local;
use tracing::{debug, error, info};

use crate::config::LoopConfig;
use crate::errors::Result;
use crate::exec::CommandRunner;
use crate::marker::MarkerGuard;
use crate::report::Reporter;
use crate::shutdown::{ShutdownListener, Signal};
use crate::watch::{scan_changed, WatchFilter};

use super::core::LoopState;
use super::{CycleDecision, CycleOutcome, ExitReason};

/// The poll / compare / execute loop.
///
/// This is the IO shell around [`LoopState`]: it stats the self path, scans
/// the watched tree, runs the command through a [`CommandRunner`], prints
/// status through a [`Reporter`] and keeps the marker files current.
/// Dropping it removes the markers.
pub struct RerunLoop<R: CommandRunner> {
    config: LoopConfig,
    markers: MarkerGuard,
    filter: WatchFilter,
    state: LoopState,
    runner: R,
    reporter: Reporter,
}

impl<R: CommandRunner> fmt::Debug for RerunLoop<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RerunLoop")
            .field("config", &self.config)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

enum Wake {
    Signal(Signal),
    Cycle(Result<CycleOutcome>),
    Slept,
}

impl<R: CommandRunner> RerunLoop<R> {
    pub fn new(
        config: LoopConfig,
        markers: MarkerGuard,
        runner: R,
        reporter: Reporter,
    ) -> Result<Self> {
        let filter = WatchFilter::new(&config.excluded_suffixes)?;
        let state = LoopState::new(markers.started_at());
        Ok(Self {
            config,
            markers,
            filter,
            state,
            runner,
            reporter,
        })
    }

    pub fn state(&self) -> &LoopState {
        &self.state
    }

    pub fn markers(&self) -> &MarkerGuard {
        &self.markers
    }

    /// Run one poll cycle: self check, scan, decide, and run if needed.
    pub async fn cycle(&mut self) -> Result<CycleOutcome> {
        self.reporter.checking()?;

        if let Some(self_path) = &self.config.self_path {
            let modified = match self.markers.fs().metadata(self_path) {
                Ok(meta) => Some(meta.modified),
                Err(err) => {
                    debug!(path = ?self_path, error = %err, "cannot stat self path");
                    None
                }
            };
            if self.state.needs_reload(modified) {
                info!(path = ?self_path, "own program changed since start");
                self.reporter.reloading()?;
                return Ok(CycleOutcome::Reload);
            }
        }

        let changed = match self.state.last_run() {
            Some(since) => scan_changed(
                self.markers.fs(),
                &self.config.watch_dir,
                &self.filter,
                since,
            )?,
            None => Vec::new(),
        };

        match self.state.decide(changed) {
            CycleDecision::Idle => {
                self.reporter.no_changes(Local::now())?;
                Ok(CycleOutcome::Idle)
            }
            CycleDecision::Run { first, changed } => {
                info!(first, changed = changed.len(), cmd = %self.config.command, "running command");

                self.reporter.clear()?;
                let outcome = self.runner.run(&self.config.command).await;
                debug!(success = outcome.is_success(), "command finished");
                self.reporter.run_finished(Local::now(), &outcome)?;

                if !first {
                    let previous = self.markers.check().listing(self.markers.fs())?;
                    self.reporter.triggered_by(&changed, previous.as_ref())?;
                }

                let stamp = self.markers.check().touch(self.markers.fs())?;
                self.state.record_run(stamp);

                Ok(CycleOutcome::Ran {
                    first,
                    changed,
                    outcome,
                })
            }
        }
    }

    /// Main loop.
    ///
    /// Cycles until a signal arrives, the program's own file changes, or
    /// (with `once`) after the first cycle. Errors inside a cycle are
    /// reported and the loop keeps polling. Consumes the loop so the
    /// markers are gone by the time this returns.
    pub async fn run(mut self, mut shutdown: ShutdownListener) -> ExitReason {
        info!(
            watch_dir = ?self.config.watch_dir,
            interval = ?self.config.interval,
            cmd = %self.config.command,
            self_check = ?self.state.self_check(),
            "rerun loop started"
        );

        loop {
            let wake = tokio::select! {
                signal = shutdown.recv() => Wake::Signal(signal),
                result = self.cycle() => Wake::Cycle(result),
            };

            match wake {
                Wake::Signal(signal) => return self.finish(ExitReason::Signal(signal)),
                Wake::Cycle(Ok(CycleOutcome::Reload)) => return self.finish(ExitReason::Reload),
                Wake::Cycle(Ok(outcome)) => debug!(?outcome, "cycle finished"),
                Wake::Cycle(Err(err)) => {
                    error!(error = %err, "cycle failed");
                    if let Err(write_err) = self.reporter.cycle_error(&err.to_string()) {
                        debug!(error = %write_err, "could not report cycle error");
                    }
                }
                Wake::Slept => {}
            }

            if self.config.once {
                return self.finish(ExitReason::Once);
            }

            let wake = tokio::select! {
                signal = shutdown.recv() => Wake::Signal(signal),
                _ = tokio::time::sleep(self.config.interval) => Wake::Slept,
            };
            if let Wake::Signal(signal) = wake {
                return self.finish(ExitReason::Signal(signal));
            }
        }
    }

    fn finish(self, reason: ExitReason) -> ExitReason {
        info!(?reason, runs = self.state.runs(), "rerun loop stopping");
        reason
    }
}
