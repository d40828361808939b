// src/engine/mod.rs

//! The rerun loop.
//!
//! The pure decision logic lives in [`core`] (no IO, no Tokio); the async
//! shell that scans, runs, reports and sleeps is [`runtime`].

use crate::exec::CommandOutcome;
use crate::shutdown::Signal;
use crate::watch::FileEntry;

pub mod core;
pub mod runtime;

pub use self::core::LoopState;
pub use self::runtime::RerunLoop;

/// What a cycle should do, as decided by [`LoopState::decide`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleDecision {
    /// Run the command. `changed` is empty on the first run.
    Run { first: bool, changed: Vec<FileEntry> },
    /// Nothing changed since the last run.
    Idle,
}

/// What a cycle actually did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    Ran {
        first: bool,
        changed: Vec<FileEntry>,
        outcome: CommandOutcome,
    },
    Idle,
    /// The program's own file changed; the caller must restart.
    Reload,
}

/// Why [`RerunLoop::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    Signal(Signal),
    Reload,
    /// `--once` finished its single cycle.
    Once,
}
