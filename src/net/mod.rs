//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! App factory → axum::Router
//!     → listener.rs (bind, wrap with request tracing, serve)
//!     → ServerHandle registered as a shutdown teardown
//!
//! Listener States:
//!     Bound → Serving → Draining → Closed
//! ```
//!
//! # Design Decisions
//! - The listener binds during startup, so traffic starts only once every
//!   earlier startup action has succeeded
//! - Draining starts as soon as shutdown begins

pub mod listener;

pub use listener::{HttpListener, ListenerError, ServerHandle};
