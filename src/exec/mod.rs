// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`command`] turns the user's argument vector into a process and waits
//!   for it, using `tokio::process::Command`.
//! - [`backend`] provides the `CommandRunner` trait the loop talks to, and the
//!   `RealCommandRunner` used in production. Tests swap in a fake.
//! - [`reload`] restarts the program itself after its binary changed.

pub mod backend;
pub mod command;
pub mod reload;

pub use backend::{CommandRunner, RealCommandRunner};
pub use command::{CommandOutcome, CommandSpec};
