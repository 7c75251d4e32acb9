//! Service orchestration facade.
//!
//! # Data Flow
//! ```text
//! Orchestrator (builder.rs):
//!     cache / message_broker / network_listener / database / custom
//!         → startup actions, in call order
//!     ping_targets → ping monitor, started with the runner
//!     on_exit → extra teardown
//!
//! Runner (runner.rs):
//!     Plan → signals + ping monitor → startup sequence → ready
//!          → wait for the shutdown coordinator to finish
//! ```
//!
//! # Design Decisions
//! - Builder methods validate eagerly and never do I/O
//! - A failed startup action goes through the same shutdown path as a signal
//! - Signal handling and process exit are injectable for tests

mod builder;
mod runner;

pub use builder::{Orchestrator, CACHE, DATABASE, MESSAGE_BROKER, NETWORK_LISTENER};
pub use runner::{Plan, ReadyCallback, Runner};
