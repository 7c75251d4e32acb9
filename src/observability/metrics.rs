//! Metrics collection and exposition.
//!
//! # Metrics
//! - `orchestrator_startup_actions_total` (counter): startup actions by action, outcome
//! - `orchestrator_health_check_failures_total` (counter): failed check cycles by monitor
//! - `orchestrator_dependency_healthy` (gauge): 1=healthy, 0=failing, by monitor
//! - `orchestrator_shutdown_duration_seconds` (histogram): trigger to exit
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op
//! - Prometheus exporter is opt-in via `observability.metrics_enabled`

use std::net::SocketAddr;
use std::time::Duration;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

pub const STARTUP_ACTIONS_TOTAL: &str = "orchestrator_startup_actions_total";
pub const HEALTH_CHECK_FAILURES_TOTAL: &str = "orchestrator_health_check_failures_total";
pub const DEPENDENCY_HEALTHY: &str = "orchestrator_dependency_healthy";
pub const SHUTDOWN_DURATION: &str = "orchestrator_shutdown_duration_seconds";

/// Install the Prometheus exporter listening on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;

    describe_counter!(STARTUP_ACTIONS_TOTAL, "Startup actions executed, by outcome");
    describe_counter!(HEALTH_CHECK_FAILURES_TOTAL, "Failed health-check cycles");
    describe_gauge!(DEPENDENCY_HEALTHY, "1 when the monitored dependency is reachable");
    describe_histogram!(SHUTDOWN_DURATION, "Time from shutdown trigger to exit in seconds");

    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_startup_action(action: &str, success: bool) {
    let outcome = if success { "success" } else { "failure" };
    counter!(STARTUP_ACTIONS_TOTAL, "action" => action.to_string(), "outcome" => outcome).increment(1);
}

pub fn record_check_failure(monitor: &str) {
    counter!(HEALTH_CHECK_FAILURES_TOTAL, "monitor" => monitor.to_string()).increment(1);
}

pub fn record_dependency_health(monitor: &str, healthy: bool) {
    gauge!(DEPENDENCY_HEALTHY, "monitor" => monitor.to_string()).set(if healthy { 1.0 } else { 0.0 });
}

pub fn record_shutdown(elapsed: Duration, timed_out: bool) {
    let path = if timed_out { "deadline" } else { "graceful" };
    histogram!(SHUTDOWN_DURATION, "path" => path).record(elapsed.as_secs_f64());
}
