//! Error taxonomy for the orchestrator.

use std::time::Duration;
use thiserror::Error;

/// Boxed error returned by external collaborators and user-supplied actions.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while configuring or running the orchestrator.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Missing or malformed configuration, raised at configuration time.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A startup action name was registered twice where uniqueness is required.
    #[error("Duplicate startup action name: {0}")]
    DuplicateName(String),

    /// A health monitor exhausted its retry budget.
    #[error("{dependency} unreachable ({target}) after {attempts} failed checks")]
    DependencyUnreachable {
        dependency: String,
        target: String,
        attempts: u32,
    },

    /// A startup action rejected; the remaining sequence was aborted.
    #[error("Startup action '{action}' failed: {source}")]
    StartupFailure {
        action: String,
        #[source]
        source: BoxError,
    },

    /// A resource's close operation failed during shutdown.
    #[error("Teardown of '{resource}' failed: {source}")]
    TeardownFailure {
        resource: String,
        #[source]
        source: BoxError,
    },

    /// Shutdown teardown did not finish before the deadline.
    #[error("Shutdown deadline of {0:?} exceeded")]
    ForcedTimeout(Duration),

    /// Underlying I/O failure (listener bind, signal registration).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl OrchestratorError {
    /// Shorthand for [`OrchestratorError::InvalidArgument`].
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}
