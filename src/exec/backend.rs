// src/exec/backend.rs

//! Pluggable command runner abstraction.
//!
//! The loop talks to a `CommandRunner` instead of spawning processes itself.
//! Production uses [`RealCommandRunner`]; tests provide a runner that records
//! invocations and returns scripted outcomes.

use std::future::Future;
use std::pin::Pin;

use super::command::{run_command, CommandOutcome, CommandSpec};

/// Trait abstracting how the user command is executed.
pub trait CommandRunner: Send {
    /// Run the command to completion and report how it ended.
    ///
    /// The loop awaits this before doing anything else, so runs never
    /// overlap. Dropping the future must stop the command.
    fn run<'a>(
        &'a mut self,
        spec: &'a CommandSpec,
    ) -> Pin<Box<dyn Future<Output = CommandOutcome> + Send + 'a>>;
}

/// Real runner used in production: spawns the command as a child process
/// with inherited stdio.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealCommandRunner;

impl CommandRunner for RealCommandRunner {
    fn run<'a>(
        &'a mut self,
        spec: &'a CommandSpec,
    ) -> Pin<Box<dyn Future<Output = CommandOutcome> + Send + 'a>> {
        Box::pin(run_command(spec))
    }
}
