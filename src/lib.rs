//! Service Orchestrator Library
//!
//! Brings a service's subsystems up in a fixed order, keeps watching the
//! ones it depends on, and tears everything down exactly once when a signal,
//! a failed dependency, a failed startup step or a panic says it is time.

pub mod config;
pub mod error;
pub mod health;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod orchestrator;
pub mod resilience;
pub mod subsystems;

pub use config::schema::ServiceConfig;
pub use error::{BoxError, OrchestratorError};
pub use lifecycle::{Shutdown, ShutdownOutcome, ShutdownReason};
pub use orchestrator::Orchestrator;
