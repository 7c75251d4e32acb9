//! Shared fakes for the orchestrator integration tests.
#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use service_orchestrator::health::{Connector, Target};
use service_orchestrator::lifecycle::ProcessExit;
use service_orchestrator::subsystems::{BrokerClient, BrokerOptions, CacheClient, DatabasePool, DatabaseSettings};
use service_orchestrator::{BoxError, ServiceConfig};

/// Defaults suitable for tests: loopback listener, no global panic hook.
pub fn test_config() -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.shutdown.trap_panics = false;
    config.listener.host = "127.0.0.1".into();
    config
}

/// Ordered record of what each fake did.
#[derive(Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<String>>>);

impl EventLog {
    pub fn push(&self, event: impl Into<String>) {
        self.0.lock().unwrap().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, event: &str) -> usize {
        self.0.lock().unwrap().iter().filter(|e| *e == event).count()
    }
}

/// Records exit codes instead of terminating the test binary.
#[derive(Clone, Default)]
pub struct RecordingExit(Arc<Mutex<Vec<i32>>>);

impl RecordingExit {
    pub fn codes(&self) -> Vec<i32> {
        self.0.lock().unwrap().clone()
    }
}

impl ProcessExit for RecordingExit {
    fn exit(&self, code: i32) {
        self.0.lock().unwrap().push(code);
    }
}

#[derive(Clone)]
pub struct FakeCache {
    pub log: EventLog,
}

#[async_trait]
impl CacheClient for FakeCache {
    async fn connect(&self, _url: &Url) -> Result<(), BoxError> {
        self.log.push("cache:connect");
        Ok(())
    }
}

#[derive(Clone)]
pub struct FakeBroker {
    pub log: EventLog,
    /// How long `close` takes.
    pub close_delay: Duration,
}

impl FakeBroker {
    pub fn new(log: EventLog) -> Self {
        Self { log, close_delay: Duration::ZERO }
    }
}

#[async_trait]
impl BrokerClient for FakeBroker {
    async fn connect(&self, _options: &BrokerOptions) -> Result<(), BoxError> {
        self.log.push("broker:connect");
        Ok(())
    }

    async fn close(&self) -> Result<(), BoxError> {
        tokio::time::sleep(self.close_delay).await;
        self.log.push("broker:close");
        Ok(())
    }
}

/// Database pool whose ping results follow `healthy(call_index)`.
#[derive(Clone)]
pub struct FakePool {
    pub log: EventLog,
    pings: Arc<AtomicUsize>,
    healthy: Arc<dyn Fn(usize) -> bool + Send + Sync>,
    open_delay: Duration,
}

impl FakePool {
    pub fn new(log: EventLog, healthy: impl Fn(usize) -> bool + Send + Sync + 'static) -> Self {
        Self {
            log,
            pings: Arc::new(AtomicUsize::new(0)),
            healthy: Arc::new(healthy),
            open_delay: Duration::ZERO,
        }
    }

    /// Make `open` take `delay` to complete.
    pub fn with_open_delay(mut self, delay: Duration) -> Self {
        self.open_delay = delay;
        self
    }

    pub fn healthy(log: EventLog) -> Self {
        Self::new(log, |_| true)
    }

    pub fn pings(&self) -> usize {
        self.pings.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DatabasePool for FakePool {
    async fn open(&self, _settings: &DatabaseSettings) -> Result<(), BoxError> {
        tokio::time::sleep(self.open_delay).await;
        self.log.push("database:open");
        Ok(())
    }

    async fn ping(&self) -> Result<(), BoxError> {
        let call = self.pings.fetch_add(1, Ordering::SeqCst);
        if (self.healthy)(call) {
            Ok(())
        } else {
            Err("connection refused".into())
        }
    }

    async fn close(&self) -> Result<(), BoxError> {
        self.log.push("database:close");
        Ok(())
    }
}

/// Connector that refuses every target listed in `down`.
#[derive(Clone, Default)]
pub struct ScriptedConnector {
    down: Arc<Mutex<HashSet<String>>>,
    attempts: Arc<Mutex<Vec<String>>>,
}

impl ScriptedConnector {
    pub fn down(targets: &[&str]) -> Self {
        let connector = Self::default();
        connector.down.lock().unwrap().extend(targets.iter().map(|t| t.to_string()));
        connector
    }

    pub fn attempts(&self) -> Vec<String> {
        self.attempts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Connector for ScriptedConnector {
    async fn connect(&self, target: &Target, _timeout: Duration) -> std::io::Result<()> {
        let target = target.to_string();
        self.attempts.lock().unwrap().push(target.clone());
        if self.down.lock().unwrap().contains(&target) {
            Err(std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused"))
        } else {
            Ok(())
        }
    }
}

/// Find a port that was free a moment ago.
pub fn free_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}
