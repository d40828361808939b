// src/exec/command.rs

use std::fmt;

use anyhow::{Context, Result};
use tokio::process::Command;
use tracing::{debug, error, info, warn};

use crate::types::ShellMode;

/// The user's command, exactly as given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    argv: Vec<String>,
    mode: ShellMode,
}

impl CommandSpec {
    /// `argv` must be non-empty; [`crate::config::validate`] enforces this
    /// before a spec is built from CLI input.
    pub fn new(argv: Vec<String>, mode: ShellMode) -> Self {
        Self { argv, mode }
    }

    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    pub fn mode(&self) -> ShellMode {
        self.mode
    }

    /// The words joined with spaces, as handed to the shell.
    pub fn joined(&self) -> String {
        self.argv.join(" ")
    }

    /// Build the process for this spec. Stdio, environment and working
    /// directory are inherited.
    pub fn to_command(&self) -> Result<Command> {
        let cmd = match self.mode {
            ShellMode::Shell => {
                // Build a shell command appropriate for the platform.
                let script = self.joined();
                if cfg!(windows) {
                    let mut c = Command::new("cmd");
                    c.arg("/C").arg(script);
                    c
                } else {
                    let mut c = Command::new("sh");
                    c.arg("-c").arg(script);
                    c
                }
            }
            ShellMode::Direct => {
                let (program, args) = self
                    .argv
                    .split_first()
                    .context("command vector is empty")?;
                let mut c = Command::new(program);
                c.args(args);
                c
            }
        };
        Ok(cmd)
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.joined())
    }
}

/// How a single command run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Success,
    /// Non-zero exit. `-1` when the process was killed by a signal.
    Failed(i32),
    /// The process could not be spawned at all.
    NotStarted(String),
}

impl CommandOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CommandOutcome::Success)
    }
}

/// Run the command to completion.
///
/// Failures never escape as errors: a command that cannot be spawned becomes
/// [`CommandOutcome::NotStarted`] and is logged. If the returned future is
/// dropped (shutdown), the child is killed.
pub async fn run_command(spec: &CommandSpec) -> CommandOutcome {
    info!(cmd = %spec, mode = ?spec.mode(), "starting command");

    let mut cmd = match spec.to_command() {
        Ok(cmd) => cmd,
        Err(err) => return not_started(spec, err),
    };
    cmd.kill_on_drop(true);

    let mut child = match cmd
        .spawn()
        .with_context(|| format!("spawning '{}'", spec))
    {
        Ok(child) => child,
        Err(err) => return not_started(spec, err),
    };

    let status = match child
        .wait()
        .await
        .with_context(|| format!("waiting for '{}'", spec))
    {
        Ok(status) => status,
        Err(err) => return not_started(spec, err),
    };

    let code = status.code().unwrap_or(-1);
    info!(cmd = %spec, exit_code = code, success = status.success(), "command exited");

    if status.success() {
        CommandOutcome::Success
    } else {
        warn!(cmd = %spec, exit_code = code, "command failed");
        CommandOutcome::Failed(code)
    }
}

fn not_started(spec: &CommandSpec, err: anyhow::Error) -> CommandOutcome {
    let message = format!("{err:#}");
    error!(cmd = %spec, error = %message, "command execution error");
    debug!(argv = ?spec.argv(), "argv of failed command");
    CommandOutcome::NotStarted(message)
}
