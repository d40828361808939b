// src/exec/reload.rs

//! Restart the running program with its original arguments.
//!
//! Callers must release their resources (markers) before calling
//! [`restart`]: on unix the process image is replaced and no destructor of
//! the current image runs afterwards.

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Command;

use tracing::info;

use crate::errors::{RerunError, Result};

/// What to re-invoke: the program binary and the arguments after argv[0].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

impl Invocation {
    /// The invocation of the current process.
    pub fn current() -> Result<Self> {
        let program = std::env::current_exe()?;
        let args = std::env::args_os().skip(1).collect();
        Ok(Self { program, args })
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }
}

/// Replace the current process with a fresh instance of `invocation`.
///
/// Only returns on failure. The pid, foreground process group and terminal
/// stay the same, so Ctrl-C keeps reaching the new instance.
#[cfg(unix)]
pub fn restart(invocation: &Invocation) -> Result<i32> {
    use std::os::unix::process::CommandExt;

    info!(program = ?invocation.program, "re-executing after self change");
    let err = invocation.command().exec();
    Err(RerunError::ReloadError {
        program: invocation.program.clone(),
        source: err,
    })
}

/// Start a fresh instance of `invocation`, wait for it and return its exit
/// code for the caller to exit with.
#[cfg(not(unix))]
pub fn restart(invocation: &Invocation) -> Result<i32> {
    info!(program = ?invocation.program, "restarting after self change");
    let status = invocation
        .command()
        .status()
        .map_err(|source| RerunError::ReloadError {
            program: invocation.program.clone(),
            source,
        })?;
    Ok(status.code().unwrap_or(1))
}
