//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the orchestrator.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::health::MonitorSettings;

/// Root configuration for the orchestrated service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Shutdown coordinator settings.
    pub shutdown: ShutdownConfig,

    /// Network listener settings.
    pub listener: ListenerConfig,

    /// Database connection defaults.
    pub database: DatabaseConfig,

    /// Database liveness monitor settings.
    pub database_monitor: DatabaseMonitorConfig,

    /// Host reachability monitor settings.
    pub ping_monitor: PingMonitorConfig,

    /// Hosts the binary pings after startup.
    pub ping: PingConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Shutdown coordinator configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ShutdownConfig {
    /// Hard deadline for teardown before the process is force-exited.
    pub deadline_secs: u64,

    /// Route panics to the shutdown coordinator.
    pub trap_panics: bool,
}

impl ShutdownConfig {
    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.deadline_secs)
    }
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            deadline_secs: 10,
            trap_panics: true,
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Interface to bind (e.g., "0.0.0.0").
    pub host: String,

    /// Port used when the caller does not pass one.
    pub port: u16,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 80,
        }
    }
}

/// Database connection defaults, used when explicit options are not supplied.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Connection URL.
    pub url: Option<String>,

    /// Database name.
    pub name: Option<String>,
}

impl DatabaseConfig {
    /// Fill fields the file left unset, e.g. from `DATABASE_URL` / `DATABASE_NAME`.
    pub fn or_defaults(mut self, url: Option<String>, name: Option<String>) -> Self {
        if self.url.is_none() {
            self.url = url;
        }
        if self.name.is_none() {
            self.name = name;
        }
        self
    }
}

/// Database liveness monitor configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseMonitorConfig {
    /// Pause after the pool opens before the first probe.
    pub readiness_delay_secs: u64,

    /// Steady-state interval between successful probes.
    pub frequency_secs: u64,

    /// Consecutive failed probes before escalating to shutdown.
    pub failure_max: u32,

    /// Backoff grows by this much per consecutive failure.
    pub backoff_step_secs: u64,
}

impl Default for DatabaseMonitorConfig {
    fn default() -> Self {
        Self {
            readiness_delay_secs: 10,
            frequency_secs: 20,
            failure_max: 8,
            backoff_step_secs: 2,
        }
    }
}

impl DatabaseMonitorConfig {
    pub fn settings(&self) -> MonitorSettings {
        MonitorSettings {
            readiness_delay: Duration::from_secs(self.readiness_delay_secs),
            frequency: Duration::from_secs(self.frequency_secs),
            failure_max: self.failure_max,
            backoff_step: Duration::from_secs(self.backoff_step_secs),
        }
    }
}

/// Host reachability monitor configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PingMonitorConfig {
    /// Pause after startup before the first check cycle.
    pub readiness_delay_secs: u64,

    /// Steady-state interval between successful cycles.
    pub frequency_secs: u64,

    /// Consecutive failed cycles before escalating to shutdown.
    pub failure_max: u32,

    /// Backoff grows by this much per consecutive failure.
    pub backoff_step_secs: u64,

    /// Per-target TCP connect timeout in milliseconds.
    pub connect_timeout_ms: u64,
}

impl Default for PingMonitorConfig {
    fn default() -> Self {
        Self {
            readiness_delay_secs: 10,
            frequency_secs: 30,
            failure_max: 8,
            backoff_step_secs: 2,
            connect_timeout_ms: 3000,
        }
    }
}

impl PingMonitorConfig {
    pub fn settings(&self) -> MonitorSettings {
        MonitorSettings {
            readiness_delay: Duration::from_secs(self.readiness_delay_secs),
            frequency: Duration::from_secs(self.frequency_secs),
            failure_max: self.failure_max,
            backoff_step: Duration::from_secs(self.backoff_step_secs),
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

/// Hosts pinged by the service binary.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct PingConfig {
    /// URLs (or bare `host:port` pairs) to keep reachable.
    pub targets: Vec<String>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Compact,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Log line rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Compact,
    Pretty,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_file_values_win_over_defaults() {
        let config = DatabaseConfig {
            url: Some("postgres://explicit".into()),
            name: None,
        }
        .or_defaults(Some("postgres://env".into()), Some("app".into()));
        assert_eq!(config.url.as_deref(), Some("postgres://explicit"));
        assert_eq!(config.name.as_deref(), Some("app"));
    }

    #[test]
    fn test_monitor_defaults() {
        let config = ServiceConfig::default();
        let db = config.database_monitor.settings();
        assert_eq!(db.readiness_delay, Duration::from_secs(10));
        assert_eq!(db.frequency, Duration::from_secs(20));
        assert_eq!(db.failure_max, 8);

        let ping = config.ping_monitor.settings();
        assert_eq!(ping.frequency, Duration::from_secs(30));
        assert_eq!(ping.backoff_step, Duration::from_secs(2));
        assert_eq!(config.shutdown.deadline(), Duration::from_secs(10));
        assert_eq!(config.listener.port, 80);
    }

    #[test]
    fn test_partial_section_keeps_own_defaults() {
        let config: ServiceConfig = toml::from_str(
            r#"
            [ping_monitor]
            failure_max = 2
            "#,
        )
        .unwrap();
        assert_eq!(config.ping_monitor.failure_max, 2);
        assert_eq!(config.ping_monitor.frequency_secs, 30);
        assert_eq!(config.database_monitor.frequency_secs, 20);
    }
}
