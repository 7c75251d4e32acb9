//! OS signal handling.
//!
//! # Responsibilities
//! - Register signal handlers (SIGINT, SIGTERM, SIGQUIT)
//! - Translate signals to internal [`Signal`] values
//! - Feed them to the shutdown coordinator through [`SignalSource`]
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - The source is injected, so tests drive shutdown with [`ChannelSignals`]
//! - Repeated signals after the first are no-ops (the coordinator latches)

use std::fmt;

use async_trait::async_trait;
use tokio::sync::mpsc;

/// Termination signals the orchestrator reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    Interrupt,
    Terminate,
    Quit,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Signal::Interrupt => "SIGINT",
            Signal::Terminate => "SIGTERM",
            Signal::Quit => "SIGQUIT",
        };
        f.write_str(name)
    }
}

/// A stream of termination signals.
#[async_trait]
pub trait SignalSource: Send + 'static {
    /// Wait for the next signal. `None` means the source is exhausted.
    async fn recv(&mut self) -> Option<Signal>;
}

/// Process signals delivered by the operating system.
pub struct OsSignals {
    #[cfg(unix)]
    interrupt: tokio::signal::unix::Signal,
    #[cfg(unix)]
    terminate: tokio::signal::unix::Signal,
    #[cfg(unix)]
    quit: tokio::signal::unix::Signal,
}

impl OsSignals {
    /// Register the handlers. Must be called from within a Tokio runtime.
    #[cfg(unix)]
    pub fn new() -> std::io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
            quit: signal(SignalKind::quit())?,
        })
    }

    #[cfg(not(unix))]
    pub fn new() -> std::io::Result<Self> {
        Ok(Self {})
    }
}

#[async_trait]
impl SignalSource for OsSignals {
    #[cfg(unix)]
    async fn recv(&mut self) -> Option<Signal> {
        tokio::select! {
            s = self.interrupt.recv() => s.map(|_| Signal::Interrupt),
            s = self.terminate.recv() => s.map(|_| Signal::Terminate),
            s = self.quit.recv() => s.map(|_| Signal::Quit),
        }
    }

    #[cfg(not(unix))]
    async fn recv(&mut self) -> Option<Signal> {
        tokio::signal::ctrl_c().await.ok().map(|_| Signal::Interrupt)
    }
}

/// Signals delivered through a channel, for embedding and tests.
pub struct ChannelSignals {
    rx: mpsc::UnboundedReceiver<Signal>,
}

impl ChannelSignals {
    /// Create a source and the sender that feeds it.
    pub fn channel() -> (mpsc::UnboundedSender<Signal>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Self { rx })
    }
}

#[async_trait]
impl SignalSource for ChannelSignals {
    async fn recv(&mut self) -> Option<Signal> {
        self.rx.recv().await
    }
}
