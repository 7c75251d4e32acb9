//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Registered actions → run one by one → first failure aborts
//!
//! Timers (timers.rs):
//!     Named delayed/recurring work → cancelled en masse at shutdown
//!
//! Shutdown (shutdown.rs):
//!     Trigger → clear timers → parallel teardown ⟂ deadline → exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT/SIGQUIT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: later actions may assume earlier ones succeeded
//! - Unordered shutdown: teardowns run concurrently
//! - Shutdown has timeout: forced exit after deadline

pub mod shutdown;
pub mod signals;
pub mod startup;
pub mod timers;

pub use shutdown::{ProcessExit, Shutdown, ShutdownOutcome, ShutdownReason, StdExit};
pub use signals::{ChannelSignals, OsSignals, Signal, SignalSource};
pub use startup::{StartupAction, StartupContext, StartupSequencer};
pub use timers::TimerRegistry;
