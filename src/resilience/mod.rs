//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Dependency probe:
//!     → timeouts.rs (enforce connect deadline)
//!     → On failure: backoff.rs (linear delay before the retry)
//!     → health monitor escalates once the failure ceiling is reached
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every probe has a deadline
//! - Backoff is linear, not exponential; the failure ceiling caps it

pub mod backoff;
pub mod timeouts;
