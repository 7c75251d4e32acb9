//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated, immutable)
//!     → handed to the orchestrator builder
//!
//! Database defaults:
//!     DATABASE_URL / DATABASE_NAME
//!     → binary CLI (clap env)
//!     → DatabaseConfig::or_defaults
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::ServiceConfig;
pub use schema::DatabaseConfig;
pub use schema::ListenerConfig;
pub use schema::ObservabilityConfig;
pub use schema::ShutdownConfig;
