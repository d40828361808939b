#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::time::Duration;

use rerun::config::LoopConfig;
use rerun::exec::CommandSpec;
use rerun::types::{ShellMode, DEFAULT_EXCLUDED_SUFFIXES};

/// Builder for `LoopConfig` to simplify test setup.
///
/// Defaults: command `echo hi` through the shell, 2 s interval, default
/// suffixes, no screen clearing, no self-reload, looping forever.
pub struct LoopConfigBuilder {
    config: LoopConfig,
}

impl LoopConfigBuilder {
    pub fn new(watch_dir: impl AsRef<Path>, check_dir: impl AsRef<Path>) -> Self {
        Self {
            config: LoopConfig {
                command: CommandSpec::new(vec!["echo".into(), "hi".into()], ShellMode::Shell),
                interval: Duration::from_secs(2),
                excluded_suffixes: DEFAULT_EXCLUDED_SUFFIXES
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
                check_dir: check_dir.as_ref().to_path_buf(),
                watch_dir: watch_dir.as_ref().to_path_buf(),
                self_path: None,
                clear_screen: false,
                once: false,
            },
        }
    }

    pub fn command(mut self, words: &[&str]) -> Self {
        self.config.command = CommandSpec::new(
            words.iter().map(|w| w.to_string()).collect(),
            self.config.command.mode(),
        );
        self
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.config.interval = interval;
        self
    }

    pub fn exclude_suffix(mut self, suffix: &str) -> Self {
        self.config.excluded_suffixes.push(suffix.to_string());
        self
    }

    pub fn self_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.self_path = Some(path.into());
        self
    }

    pub fn once(mut self) -> Self {
        self.config.once = true;
        self
    }

    pub fn build(self) -> LoopConfig {
        self.config
    }
}
