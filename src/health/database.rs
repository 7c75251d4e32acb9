//! Database liveness check.

use std::sync::Arc;

use async_trait::async_trait;

use crate::health::monitor::{CheckFailure, HealthCheck};
use crate::subsystems::DatabasePool;

/// Probes the pool with its trivial round-trip query.
pub struct DatabaseCheck {
    pool: Arc<dyn DatabasePool>,
    target: String,
}

impl DatabaseCheck {
    /// `target` names the database in logs and the escalation reason.
    pub fn new(pool: Arc<dyn DatabasePool>, target: impl Into<String>) -> Self {
        Self {
            pool,
            target: target.into(),
        }
    }
}

#[async_trait]
impl HealthCheck for DatabaseCheck {
    fn dependency(&self) -> &str {
        "database"
    }

    async fn check(&self) -> Result<(), CheckFailure> {
        self.pool.ping().await.map_err(|error| CheckFailure {
            target: self.target.clone(),
            error,
        })
    }
}
