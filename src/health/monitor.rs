//! Recurring health-check loop.
//!
//! # Responsibilities
//! - Wait out the readiness delay, then probe the dependency
//! - Feed results into the state machine and sleep as it directs
//! - Request shutdown on escalation
//!
//! The loop runs as a single named timer, so cancelling the timer stops it.

use std::fmt;

use async_trait::async_trait;
use tokio::time;

use crate::error::{BoxError, OrchestratorError};
use crate::health::state::{HealthState, MonitorSettings, Next};
use crate::lifecycle::shutdown::{Shutdown, ShutdownReason};
use crate::observability::metrics;

/// A failed check, naming what could not be reached.
#[derive(Debug)]
pub struct CheckFailure {
    pub target: String,
    pub error: BoxError,
}

impl fmt::Display for CheckFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.target, self.error)
    }
}

/// One probe of a monitored dependency.
#[async_trait]
pub trait HealthCheck: Send + Sync + 'static {
    /// Short dependency name used in logs and the escalation reason.
    fn dependency(&self) -> &str;

    async fn check(&self) -> Result<(), CheckFailure>;
}

pub struct HealthMonitor<C> {
    check: C,
    state: HealthState,
}

impl<C: HealthCheck> HealthMonitor<C> {
    pub fn new(check: C, settings: MonitorSettings) -> Self {
        Self {
            check,
            state: HealthState::new(settings),
        }
    }

    /// Timer name this monitor is registered under.
    pub fn timer_name(&self) -> String {
        format!("{}-monitor", self.check.dependency())
    }

    /// Run until escalation. Escalation triggers `shutdown` and ends the loop.
    pub async fn run(mut self, shutdown: Shutdown) {
        let settings = *self.state.settings();
        let dependency = self.check.dependency().to_string();

        tracing::info!(
            dependency = %dependency,
            readiness_delay = ?settings.readiness_delay,
            frequency = ?settings.frequency,
            failure_max = settings.failure_max,
            "Health monitor starting"
        );
        time::sleep(settings.readiness_delay).await;

        loop {
            self.state.begin_check();
            let next = match self.check.check().await {
                Ok(()) => {
                    let (next, recovered) = self.state.record_success();
                    if recovered {
                        tracing::info!(dependency = %dependency, "Dependency recovered");
                    } else {
                        tracing::debug!(dependency = %dependency, "Health check passed");
                    }
                    metrics::record_dependency_health(&dependency, true);
                    next
                }
                Err(failure) => {
                    metrics::record_check_failure(&dependency);
                    metrics::record_dependency_health(&dependency, false);
                    match self.state.record_failure() {
                        Next::Escalate => {
                            let err = OrchestratorError::DependencyUnreachable {
                                dependency: dependency.clone(),
                                target: failure.target.clone(),
                                attempts: self.state.failure_count(),
                            };
                            tracing::error!(error = %err, last_error = %failure.error, "Health check escalated");
                            shutdown.trigger(ShutdownReason::DependencyUnreachable {
                                dependency,
                                target: failure.target,
                            });
                            return;
                        }
                        Next::Retry(delay) => {
                            tracing::warn!(
                                dependency = %dependency,
                                target = %failure.target,
                                error = %failure.error,
                                attempt = self.state.failure_count(),
                                failure_max = settings.failure_max,
                                delay = ?delay,
                                "Health check failed, backing off"
                            );
                            Next::Retry(delay)
                        }
                        next => next,
                    }
                }
            };

            match next {
                Next::Schedule(delay) | Next::Retry(delay) => time::sleep(delay).await,
                Next::Escalate => return,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::shutdown::ProcessExit;
    use crate::lifecycle::timers::TimerRegistry;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio::time::Instant;

    struct NullExit;

    impl ProcessExit for NullExit {
        fn exit(&self, _code: i32) {}
    }

    /// Replays scripted results, recording when each check ran.
    struct Scripted {
        results: Mutex<VecDeque<bool>>,
        calls: Arc<Mutex<Vec<Instant>>>,
    }

    #[async_trait]
    impl HealthCheck for Scripted {
        fn dependency(&self) -> &str {
            "database"
        }

        async fn check(&self) -> Result<(), CheckFailure> {
            self.calls.lock().unwrap().push(Instant::now());
            let ok = self.results.lock().unwrap().pop_front().unwrap_or(false);
            if ok {
                Ok(())
            } else {
                Err(CheckFailure { target: "db:5432".into(), error: "refused".into() })
            }
        }
    }

    fn settings(failure_max: u32) -> MonitorSettings {
        MonitorSettings {
            readiness_delay: Duration::from_secs(10),
            frequency: Duration::from_secs(20),
            failure_max,
            backoff_step: Duration::from_secs(2),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_check_timeline_follows_backoff() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let check = Scripted {
            results: Mutex::new(VecDeque::from(vec![true, false, false, true, false, false, false])),
            calls: calls.clone(),
        };
        let shutdown = Shutdown::new(TimerRegistry::new(), Duration::from_secs(10), Arc::new(NullExit));
        let start = Instant::now();

        HealthMonitor::new(check, settings(3)).run(shutdown.clone()).await;

        let offsets: Vec<u64> = calls
            .lock()
            .unwrap()
            .iter()
            .map(|t| (*t - start).as_secs())
            .collect();
        // ready at 10; ok +20; fail +2; fail +4; ok resets, +20; fail +2; fail +4; escalate
        assert_eq!(offsets, vec![10, 30, 32, 36, 56, 58, 62]);

        let outcome = shutdown.wait().await;
        assert_eq!(
            outcome.reason,
            ShutdownReason::DependencyUnreachable { dependency: "database".into(), target: "db:5432".into() }
        );
    }

    #[test]
    fn test_timer_name() {
        let check = Scripted { results: Mutex::new(VecDeque::new()), calls: Arc::new(Mutex::new(Vec::new())) };
        assert_eq!(HealthMonitor::new(check, settings(1)).timer_name(), "database-monitor");
    }
}
