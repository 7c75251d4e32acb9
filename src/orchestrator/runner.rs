//! Executes a frozen [`Plan`].

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::BoxFuture;

use crate::error::{BoxError, OrchestratorError};
use crate::health::{Connector, HealthMonitor, MonitorSettings, PingCheck, Target};
use crate::lifecycle::{
    ProcessExit, Shutdown, ShutdownOutcome, ShutdownReason, SignalSource, StartupContext, StartupSequencer,
    TimerRegistry,
};

/// Called once every startup action has succeeded.
pub type ReadyCallback = Box<dyn FnOnce() + Send>;

pub(crate) type ExitHook = Box<dyn FnOnce() -> BoxFuture<'static, Result<(), BoxError>> + Send>;

const EXIT_HOOK: &str = "exit-hook";

pub(crate) struct PingPlan {
    pub(crate) targets: Vec<Target>,
    pub(crate) settings: MonitorSettings,
}

/// Everything the builder collected, no longer modifiable.
pub struct Plan {
    pub(crate) sequencer: StartupSequencer,
    pub(crate) ping: Option<PingPlan>,
    pub(crate) exit_hooks: Vec<ExitHook>,
    pub(crate) connector: Arc<dyn Connector>,
    pub(crate) connect_timeout: Duration,
    pub(crate) deadline: Duration,
    pub(crate) trap_panics: bool,
}

impl Plan {
    /// Startup action names in execution order.
    pub fn action_names(&self) -> Vec<String> {
        self.sequencer.names().map(str::to_string).collect()
    }

    pub fn monitors_ping(&self) -> bool {
        self.ping.is_some()
    }
}

pub struct Runner {
    plan: Plan,
    signals: Box<dyn SignalSource>,
    exit: Arc<dyn ProcessExit>,
}

impl Runner {
    pub fn new(plan: Plan, signals: Box<dyn SignalSource>, exit: Arc<dyn ProcessExit>) -> Self {
        Self { plan, signals, exit }
    }

    /// Start monitors and signal handling, run the startup sequence, and
    /// wait for shutdown to finish.
    pub async fn run(self, ready: Option<ReadyCallback>) -> ShutdownOutcome {
        let Runner {
            plan,
            mut signals,
            exit,
        } = self;

        let timers = TimerRegistry::new();
        let shutdown = Shutdown::new(timers.clone(), plan.deadline, exit);
        if plan.trap_panics {
            shutdown.trap_panics();
        }

        for hook in plan.exit_hooks {
            shutdown.register(EXIT_HOOK, hook);
        }

        if let Some(ping) = plan.ping {
            let check = PingCheck::new(ping.targets, plan.connector, plan.connect_timeout);
            let monitor = HealthMonitor::new(check, ping.settings);
            timers.spawn(&monitor.timer_name(), monitor.run(shutdown.clone()));
        }

        let on_signal = shutdown.clone();
        tokio::spawn(async move {
            while let Some(signal) = signals.recv().await {
                tracing::info!(signal = %signal, "Signal received");
                on_signal.trigger(ShutdownReason::Signal(signal));
            }
        });

        let ctx = StartupContext {
            timers,
            shutdown: shutdown.clone(),
        };

        tokio::select! {
            result = plan.sequencer.run(&ctx) => match result {
                Ok(()) if shutdown.is_triggered() => {}
                Ok(()) => {
                    tracing::info!("Service ready");
                    if let Some(ready) = ready {
                        ready();
                    }
                }
                Err(err) => {
                    tracing::error!(error = %err, "Startup failed");
                    let action = match err {
                        OrchestratorError::StartupFailure { action, .. } => action,
                        other => other.to_string(),
                    };
                    shutdown.trigger(ShutdownReason::StartupFailure { action });
                }
            },
            outcome = shutdown.wait() => return outcome,
        }

        shutdown.wait().await
    }
}
