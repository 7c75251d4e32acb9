//! Linear backoff for health-check retries.

use std::time::Duration;

/// Delay before the next retry after `failure_count` consecutive failures.
///
/// Grows by `step` per failure; the monitor's failure ceiling bounds it, so
/// there is no explicit cap here.
pub fn calculate_backoff(failure_count: u32, step: Duration) -> Duration {
    step.saturating_mul(failure_count)
}
