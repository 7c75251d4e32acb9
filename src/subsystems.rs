//! Interfaces of the external subsystems the orchestrator starts and stops.
//!
//! The orchestrator owns ordering, liveness and teardown; the clients
//! themselves (database driver, cache, broker) live behind these traits.

use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::error::BoxError;

/// A cache backend client.
#[async_trait]
pub trait CacheClient: Send + Sync + 'static {
    async fn connect(&self, url: &Url) -> Result<(), BoxError>;
}

/// Connection options for the message broker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerOptions {
    pub url: String,
    /// Name the connection is announced under, if the broker supports it.
    pub client_name: Option<String>,
}

impl BrokerOptions {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client_name: None,
        }
    }
}

/// A message broker client.
#[async_trait]
pub trait BrokerClient: Send + Sync + 'static {
    async fn connect(&self, options: &BrokerOptions) -> Result<(), BoxError>;

    async fn close(&self) -> Result<(), BoxError>;
}

/// Caller-supplied database options; unset fields fall back to the
/// `database` config section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatabaseOptions {
    pub url: Option<String>,
    pub name: Option<String>,
    /// Overrides `database_monitor.failure_max`.
    pub failure_max: Option<u32>,
    /// Overrides `database_monitor.frequency_secs`.
    pub frequency: Option<Duration>,
}

/// Resolved connection settings handed to the pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseSettings {
    pub url: String,
    pub name: Option<String>,
}

/// A database connection pool.
#[async_trait]
pub trait DatabasePool: Send + Sync + 'static {
    async fn open(&self, settings: &DatabaseSettings) -> Result<(), BoxError>;

    /// Trivial round-trip query used as the liveness probe.
    async fn ping(&self) -> Result<(), BoxError>;

    async fn close(&self) -> Result<(), BoxError>;
}

/// Options for the host reachability monitor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PingOptions {
    /// Overrides `ping_monitor.failure_max`.
    pub failure_max: Option<u32>,
    /// Overrides `ping_monitor.frequency_secs`.
    pub frequency: Option<Duration>,
}
