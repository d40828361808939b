// src/engine/core.rs

//! Pure loop state.
//!
//! [`LoopState`] holds the two baselines the loop compares against and
//! decides what each cycle does. It performs no IO, so every rule here is
//! unit tested without a filesystem or processes.

use std::time::SystemTime;

use crate::engine::CycleDecision;
use crate::watch::FileEntry;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopState {
    /// Mtime of the check marker after the most recent run; `None` until the
    /// first run completes.
    last_run: Option<SystemTime>,
    /// Mtime of the exec marker written at startup.
    self_check: SystemTime,
    runs: u64,
}

impl LoopState {
    pub fn new(self_check: SystemTime) -> Self {
        Self {
            last_run: None,
            self_check,
            runs: 0,
        }
    }

    pub fn last_run(&self) -> Option<SystemTime> {
        self.last_run
    }

    pub fn self_check(&self) -> SystemTime {
        self.self_check
    }

    /// Number of command runs so far.
    pub fn runs(&self) -> u64 {
        self.runs
    }

    /// True if the program's own file is strictly newer than the startup
    /// baseline. An unreadable self path never triggers a reload.
    pub fn needs_reload(&self, self_modified: Option<SystemTime>) -> bool {
        matches!(self_modified, Some(modified) if modified > self.self_check)
    }

    /// Decide whether to run, given the files found newer than
    /// [`LoopState::last_run`].
    ///
    /// Runs when there is no marker yet, or when anything changed.
    pub fn decide(&self, changed: Vec<FileEntry>) -> CycleDecision {
        match self.last_run {
            None => CycleDecision::Run {
                first: true,
                changed: Vec::new(),
            },
            Some(_) if !changed.is_empty() => CycleDecision::Run {
                first: false,
                changed,
            },
            Some(_) => CycleDecision::Idle,
        }
    }

    /// Record a finished run whose marker now carries `marker_time`.
    pub fn record_run(&mut self, marker_time: SystemTime) {
        self.last_run = Some(marker_time);
        self.runs += 1;
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::time::Duration;

    use super::*;

    fn t(secs: u64) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(secs)
    }

    fn file(name: &str, at: SystemTime) -> FileEntry {
        FileEntry {
            path: PathBuf::from(name),
            len: 0,
            modified: at,
            mode: None,
        }
    }

    #[test]
    fn first_cycle_always_runs() {
        let state = LoopState::new(t(100));
        assert_eq!(
            state.decide(Vec::new()),
            CycleDecision::Run {
                first: true,
                changed: Vec::new()
            }
        );
    }

    #[test]
    fn later_cycles_run_only_on_changes() {
        let mut state = LoopState::new(t(100));
        state.record_run(t(110));

        assert_eq!(state.decide(Vec::new()), CycleDecision::Idle);

        let changed = vec![file("newfile.txt", t(111))];
        assert_eq!(
            state.decide(changed.clone()),
            CycleDecision::Run {
                first: false,
                changed
            }
        );
    }

    #[test]
    fn record_run_moves_baseline_and_counts() {
        let mut state = LoopState::new(t(100));
        state.record_run(t(110));
        state.record_run(t(120));
        assert_eq!(state.last_run(), Some(t(120)));
        assert_eq!(state.runs(), 2);
    }

    #[test]
    fn reload_requires_strictly_newer_self() {
        let state = LoopState::new(t(100));
        assert!(!state.needs_reload(None));
        assert!(!state.needs_reload(Some(t(99))));
        assert!(!state.needs_reload(Some(t(100))));
        assert!(state.needs_reload(Some(t(101))));
    }
}
