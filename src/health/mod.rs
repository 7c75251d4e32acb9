//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Monitor loop (monitor.rs):
//!     Readiness delay
//!     → Probe dependency (database.rs / ping.rs)
//!     → Update state.rs
//!     → Sleep frequency or backoff, or escalate to shutdown
//!
//! State machine (state.rs):
//!     Idle → Checking → Succeeded | Backoff | Escalated
//! ```
//!
//! # Design Decisions
//! - One monitor per dependency kind, each its own loop
//! - Counters are shared across a monitor's targets, not per target
//! - Escalation is terminal; shutdown takes over

pub mod database;
pub mod monitor;
pub mod ping;
pub mod state;

pub use database::DatabaseCheck;
pub use monitor::{CheckFailure, HealthCheck, HealthMonitor};
pub use ping::{parse_targets, Connector, PingCheck, Target, TcpConnector};
pub use state::{HealthState, MonitorPhase, MonitorSettings, Next};
