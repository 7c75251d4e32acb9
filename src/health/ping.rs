//! Host reachability check.
//!
//! # Responsibilities
//! - Turn a URL list into deduplicated `host:port` targets
//! - Connect to every target concurrently each cycle
//!
//! # Design Decisions
//! - A cycle passes only if every target connects
//! - One failed cycle counts once, however many targets failed
//! - Missing ports default to 80

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::future::join_all;
use tokio::net::TcpStream;
use url::Url;

use crate::error::OrchestratorError;
use crate::health::monitor::{CheckFailure, HealthCheck};
use crate::resilience::timeouts::with_timeout;

const DEFAULT_PORT: u16 = 80;

/// A `host:port` pair to connect to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Target {
    pub host: String,
    pub port: u16,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl Target {
    /// Parse a URL (`http://host:8080/x`) or bare `host:port`.
    pub fn parse(input: &str) -> Result<Self, OrchestratorError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(OrchestratorError::invalid("ping target must not be empty"));
        }
        let url = if trimmed.contains("://") {
            Url::parse(trimmed)
        } else {
            Url::parse(&format!("tcp://{}", trimmed))
        }
        .map_err(|e| OrchestratorError::invalid(format!("invalid ping target '{}': {}", input, e)))?;

        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| OrchestratorError::invalid(format!("ping target '{}' has no host", input)))?;

        Ok(Self {
            host: host.to_string(),
            port: url.port().unwrap_or(DEFAULT_PORT),
        })
    }
}

/// Parse and deduplicate targets, keeping first-seen order.
pub fn parse_targets<S: AsRef<str>>(urls: &[S]) -> Result<Vec<Target>, OrchestratorError> {
    if urls.is_empty() {
        return Err(OrchestratorError::invalid("ping targets require at least one URL"));
    }
    let mut targets: Vec<Target> = Vec::with_capacity(urls.len());
    for url in urls {
        let target = Target::parse(url.as_ref())?;
        if !targets.contains(&target) {
            targets.push(target);
        }
    }
    Ok(targets)
}

/// Establishes a raw connection to a target.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    async fn connect(&self, target: &Target, timeout: Duration) -> std::io::Result<()>;
}

/// Plain TCP connect, closed immediately.
#[derive(Debug, Default, Clone, Copy)]
pub struct TcpConnector;

#[async_trait]
impl Connector for TcpConnector {
    async fn connect(&self, target: &Target, timeout: Duration) -> std::io::Result<()> {
        let addr = target.to_string();
        with_timeout(timeout, TcpStream::connect(addr.as_str())).await.map(drop)
    }
}

pub struct PingCheck {
    targets: Vec<Target>,
    connector: Arc<dyn Connector>,
    timeout: Duration,
}

impl PingCheck {
    pub fn new(targets: Vec<Target>, connector: Arc<dyn Connector>, timeout: Duration) -> Self {
        Self {
            targets,
            connector,
            timeout,
        }
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }
}

#[async_trait]
impl HealthCheck for PingCheck {
    fn dependency(&self) -> &str {
        "ping"
    }

    async fn check(&self) -> Result<(), CheckFailure> {
        let attempts = self
            .targets
            .iter()
            .map(|target| async move { (target, self.connector.connect(target, self.timeout).await) });
        let results = join_all(attempts).await;

        let mut first_failure = None;
        for (target, result) in results {
            if let Err(e) = result {
                tracing::debug!(target = %target, error = %e, "Ping target unreachable");
                first_failure.get_or_insert((target, e));
            }
        }

        match first_failure {
            None => Ok(()),
            Some((target, e)) => Err(CheckFailure {
                target: target.to_string(),
                error: Box::new(e),
            }),
        }
    }
}
