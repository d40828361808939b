// src/shutdown.rs

//! Termination signals.
//!
//! The loop races every await point against a [`ShutdownListener`]. When a
//! signal arrives the in-flight cycle future is dropped (killing a running
//! command), the loop returns, and the marker guard cleans up on the way out.

use tokio::sync::watch;
use tracing::info;

use crate::errors::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Interrupt,
    Terminate,
}

impl Signal {
    /// Conventional shell exit status for a process ended by this signal.
    pub fn exit_code(self) -> i32 {
        match self {
            Signal::Interrupt => 128 + 2,
            Signal::Terminate => 128 + 15,
        }
    }
}

/// Sending half; used by the signal task and by tests.
#[derive(Debug, Clone)]
pub struct ShutdownTrigger {
    tx: watch::Sender<Option<Signal>>,
}

impl ShutdownTrigger {
    pub fn fire(&self, signal: Signal) {
        // A closed channel means the loop is already gone.
        let _ = self.tx.send(Some(signal));
    }
}

#[derive(Debug, Clone)]
pub struct ShutdownListener {
    rx: watch::Receiver<Option<Signal>>,
}

impl ShutdownListener {
    /// Resolve once a signal has been fired. Never resolves if every trigger
    /// is dropped without firing.
    pub async fn recv(&mut self) -> Signal {
        loop {
            if let Some(signal) = *self.rx.borrow_and_update() {
                return signal;
            }
            if self.rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

/// A connected trigger/listener pair.
pub fn channel() -> (ShutdownTrigger, ShutdownListener) {
    let (tx, rx) = watch::channel(None);
    (ShutdownTrigger { tx }, ShutdownListener { rx })
}

/// Install a shutdown handler that listens for SIGTERM and SIGINT.
///
/// Must be called from within a Tokio runtime.
#[cfg(unix)]
pub fn install_shutdown_handler() -> Result<ShutdownListener> {
    use tokio::signal::unix::{signal, SignalKind};

    let (trigger, listener) = channel();
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    tokio::spawn(async move {
        tokio::select! {
            _ = sigterm.recv() => {
                info!("received SIGTERM, shutting down");
                trigger.fire(Signal::Terminate);
            }
            _ = sigint.recv() => {
                info!("received SIGINT, shutting down");
                trigger.fire(Signal::Interrupt);
            }
        }
    });

    Ok(listener)
}

/// Install a Ctrl-C handler.
///
/// Must be called from within a Tokio runtime.
#[cfg(not(unix))]
pub fn install_shutdown_handler() -> Result<ShutdownListener> {
    let (trigger, listener) = channel();

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            eprintln!("failed to listen for Ctrl+C: {e}");
            return;
        }
        info!("received Ctrl+C, shutting down");
        trigger.fire(Signal::Interrupt);
    });

    Ok(listener)
}
