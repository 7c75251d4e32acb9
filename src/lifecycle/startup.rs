//! Startup orchestration.
//!
//! # Responsibilities
//! - Keep named startup actions in registration order
//! - Run them one at a time, each awaited before the next starts
//! - Stop at the first failure
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently
//! - Re-registering a name replaces the action but keeps its position

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use futures_util::future::{BoxFuture, FutureExt};

use crate::error::{BoxError, OrchestratorError};
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::timers::TimerRegistry;
use crate::observability::metrics;

/// Runtime handles a startup action may use to register follow-up work.
#[derive(Clone)]
pub struct StartupContext {
    pub timers: Arc<TimerRegistry>,
    pub shutdown: Shutdown,
}

type ActionFn = Box<dyn FnOnce(StartupContext) -> BoxFuture<'static, Result<(), BoxError>> + Send>;

/// A named unit of initialization work, consumed exactly once.
pub struct StartupAction {
    run: ActionFn,
}

impl StartupAction {
    pub fn new<F, Fut>(action: F) -> Self
    where
        F: FnOnce(StartupContext) -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        Self {
            run: Box::new(move |ctx| action(ctx).boxed()),
        }
    }
}

/// Ordered registry of startup actions.
#[derive(Default)]
pub struct StartupSequencer {
    order: Vec<String>,
    actions: HashMap<String, StartupAction>,
}

impl StartupSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `action` under `name`, replacing any earlier registration.
    pub fn register(&mut self, name: &str, action: StartupAction) {
        if self.actions.insert(name.to_string(), action).is_some() {
            tracing::debug!(action = name, "Startup action replaced");
        } else {
            self.order.push(name.to_string());
        }
    }

    /// Register `action` under `name`, failing if the name is taken.
    pub fn register_unique(&mut self, name: &str, action: StartupAction) -> Result<(), OrchestratorError> {
        if self.actions.contains_key(name) {
            return Err(OrchestratorError::DuplicateName(name.to_string()));
        }
        self.register(name, action);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    /// Action names in execution order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Run every action in registration order, stopping at the first failure.
    ///
    /// Stops early, without error, if shutdown begins mid-sequence.
    pub async fn run(mut self, ctx: &StartupContext) -> Result<(), OrchestratorError> {
        let total = self.order.len();
        for (index, name) in std::mem::take(&mut self.order).into_iter().enumerate() {
            if ctx.shutdown.is_triggered() {
                tracing::warn!(action = %name, "Shutdown in progress, abandoning startup");
                return Ok(());
            }
            let Some(action) = self.actions.remove(&name) else {
                continue;
            };

            tracing::info!(action = %name, step = index + 1, total, "Starting");
            match (action.run)(ctx.clone()).await {
                Ok(()) => {
                    metrics::record_startup_action(&name, true);
                    tracing::info!(action = %name, "Started");
                }
                Err(source) => {
                    metrics::record_startup_action(&name, false);
                    return Err(OrchestratorError::StartupFailure { action: name, source });
                }
            }
        }
        Ok(())
    }
}
