//! Monitor health state machine.
//!
//! # States
//! ```text
//! Idle ──readiness delay──► Checking
//! Checking ──ok──► Succeeded ──frequency──► Checking
//! Checking ──fail, count < max──► Backoff ──step × count──► Checking
//! Checking ──fail, count = max──► Escalated (terminal)
//! ```
//!
//! # Design Decisions
//! - Pure: no timers or I/O, the monitor loop drives it
//! - One failed cycle is one failure, however many targets failed
//! - A single success resets the failure streak

use std::time::Duration;

use crate::resilience::backoff::calculate_backoff;

/// Timing and escalation settings for one monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorSettings {
    /// Pause before the first check.
    pub readiness_delay: Duration,
    /// Interval between checks while healthy.
    pub frequency: Duration,
    /// Consecutive failures that trigger escalation.
    pub failure_max: u32,
    /// Backoff grows by this much per consecutive failure.
    pub backoff_step: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorPhase {
    Idle,
    Checking,
    Succeeded,
    Backoff,
    Escalated,
}

/// What the monitor loop should do after a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Next {
    /// Check again after the steady-state frequency.
    Schedule(Duration),
    /// Retry after a backoff delay.
    Retry(Duration),
    /// Give up and request shutdown.
    Escalate,
}

#[derive(Debug, Clone)]
pub struct HealthState {
    settings: MonitorSettings,
    phase: MonitorPhase,
    failure_count: u32,
    failing: bool,
}

impl HealthState {
    pub fn new(settings: MonitorSettings) -> Self {
        Self {
            settings,
            phase: MonitorPhase::Idle,
            failure_count: 0,
            failing: false,
        }
    }

    pub fn phase(&self) -> MonitorPhase {
        self.phase
    }

    pub fn failure_count(&self) -> u32 {
        self.failure_count
    }

    pub fn is_failing(&self) -> bool {
        self.failing
    }

    pub fn settings(&self) -> &MonitorSettings {
        &self.settings
    }

    /// Enter `Checking`. No-op once escalated.
    pub fn begin_check(&mut self) {
        if self.phase != MonitorPhase::Escalated {
            self.phase = MonitorPhase::Checking;
        }
    }

    /// Record a passing check. Returns the next step and whether this was a recovery.
    pub fn record_success(&mut self) -> (Next, bool) {
        let recovered = self.failing;
        self.failure_count = 0;
        self.failing = false;
        self.phase = MonitorPhase::Succeeded;
        (Next::Schedule(self.settings.frequency), recovered)
    }

    /// Record a failed check.
    pub fn record_failure(&mut self) -> Next {
        self.failing = true;
        self.failure_count = self.failure_count.saturating_add(1);

        if self.failure_count >= self.settings.failure_max {
            self.phase = MonitorPhase::Escalated;
            Next::Escalate
        } else {
            self.phase = MonitorPhase::Backoff;
            Next::Retry(calculate_backoff(self.failure_count, self.settings.backoff_step))
        }
    }
}
