//! Shutdown coordination.
//!
//! The first [`Shutdown::trigger`] wins: it cancels every pending timer, runs
//! the teardown of every resource that actually started (concurrently), and
//! races that against a hard deadline before handing an exit code to the
//! [`ProcessExit`] handler. Later triggers are no-ops.

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use futures_util::future::{join_all, BoxFuture, FutureExt};
use tokio::sync::{broadcast, watch};
use tokio::time::Instant;

use crate::error::{BoxError, OrchestratorError};
use crate::lifecycle::signals::Signal;
use crate::lifecycle::timers::TimerRegistry;
use crate::observability::metrics;

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;

/// Why shutdown was requested. Each variant carries its exit status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShutdownReason {
    /// An OS termination signal.
    Signal(Signal),
    /// A health monitor exhausted its retry budget.
    DependencyUnreachable { dependency: String, target: String },
    /// A startup action failed.
    StartupFailure { action: String },
    /// A panic anywhere in the process.
    Panic(String),
    /// Explicit request by the embedding application.
    Forced(String),
}

impl ShutdownReason {
    pub fn exit_code(&self) -> i32 {
        match self {
            ShutdownReason::Signal(_) => EXIT_SUCCESS,
            _ => EXIT_FAILURE,
        }
    }
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShutdownReason::Signal(s) => write!(f, "received {}", s),
            ShutdownReason::DependencyUnreachable { dependency, target } => {
                write!(f, "{} unreachable ({})", dependency, target)
            }
            ShutdownReason::StartupFailure { action } => write!(f, "startup action '{}' failed", action),
            ShutdownReason::Panic(msg) => write!(f, "panic: {}", msg),
            ShutdownReason::Forced(msg) => write!(f, "forced: {}", msg),
        }
    }
}

/// What the coordinator did once it finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShutdownOutcome {
    pub reason: ShutdownReason,
    pub exit_code: i32,
    /// True when the deadline fired before teardown settled.
    pub timed_out: bool,
}

/// Terminates the process once shutdown completes.
pub trait ProcessExit: Send + Sync + 'static {
    fn exit(&self, code: i32);
}

/// Exits through [`std::process::exit`].
#[derive(Debug, Default, Clone, Copy)]
pub struct StdExit;

impl ProcessExit for StdExit {
    fn exit(&self, code: i32) {
        std::process::exit(code);
    }
}

type TeardownFn = Box<dyn FnOnce() -> BoxFuture<'static, Result<(), BoxError>> + Send>;

struct Teardown {
    resource: String,
    run: TeardownFn,
}

struct Inner {
    triggered: AtomicBool,
    tx: broadcast::Sender<()>,
    timers: Arc<TimerRegistry>,
    resources: Mutex<Vec<Teardown>>,
    deadline: Duration,
    exit: Arc<dyn ProcessExit>,
    outcome: watch::Sender<Option<ShutdownOutcome>>,
}

/// Coordinator for graceful shutdown.
///
/// Cheap to clone; all clones share the same latch and resource list.
#[derive(Clone)]
pub struct Shutdown {
    inner: Arc<Inner>,
}

impl Shutdown {
    /// Create a new shutdown coordinator.
    pub fn new(timers: Arc<TimerRegistry>, deadline: Duration, exit: Arc<dyn ProcessExit>) -> Self {
        let (tx, _) = broadcast::channel(1);
        let (outcome, _) = watch::channel(None);
        Self {
            inner: Arc::new(Inner {
                triggered: AtomicBool::new(false),
                tx,
                timers,
                resources: Mutex::new(Vec::new()),
                deadline,
                exit,
                outcome,
            }),
        }
    }

    /// Subscribe to the moment shutdown begins.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.inner.tx.subscribe()
    }

    /// Register the teardown of a resource that has started.
    ///
    /// Once shutdown has begun the teardown runs immediately instead.
    pub fn register<F, Fut>(&self, resource: &str, teardown: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        let mut resources = self.inner.resources.lock().unwrap_or_else(|e| e.into_inner());
        if self.is_triggered() {
            drop(resources);
            tracing::warn!(resource, "Resource started after shutdown began, tearing it down now");
            let resource = resource.to_string();
            tokio::spawn(async move {
                let result = teardown().await;
                log_teardown(resource, result);
            });
            return;
        }
        resources.push(Teardown {
            resource: resource.to_string(),
            run: Box::new(move || teardown().boxed()),
        });
        tracing::debug!(resource, "Teardown registered");
    }

    /// Number of registered teardowns not yet run.
    pub fn resource_count(&self) -> usize {
        self.inner.resources.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_triggered(&self) -> bool {
        self.inner.triggered.load(Ordering::SeqCst)
    }

    /// Request shutdown. Returns false if shutdown was already underway.
    ///
    /// Must be called from within a Tokio runtime; the teardown runs on its
    /// own task so callers that are themselves timers can be cancelled.
    pub fn trigger(&self, reason: ShutdownReason) -> bool {
        if self
            .inner
            .triggered
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::debug!(reason = %reason, "Shutdown already in progress, ignoring trigger");
            return false;
        }

        tracing::info!(reason = %reason, deadline = ?self.inner.deadline, "Shutdown triggered");
        let _ = self.inner.tx.send(());
        tokio::spawn(self.clone().execute(reason));
        true
    }

    /// Wait until the coordinator has finished and called the exit handler.
    pub async fn wait(&self) -> ShutdownOutcome {
        let mut rx = self.inner.outcome.subscribe();
        loop {
            if let Some(outcome) = rx.borrow_and_update().clone() {
                return outcome;
            }
            // The sender lives in `inner`, so the channel cannot close while `self` exists.
            let _ = rx.changed().await;
        }
    }

    /// Route panics to this coordinator, chaining the previous hook.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn trap_panics(&self) {
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        let handle = tokio::runtime::Handle::current();
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            previous(info);
            if let Some(inner) = weak.upgrade() {
                let _guard = handle.enter();
                Shutdown { inner }.trigger(ShutdownReason::Panic(info.to_string()));
            }
        }));
    }

    async fn execute(self, reason: ShutdownReason) {
        let started = Instant::now();

        let cancelled = self.inner.timers.cancel_all();
        tracing::info!(cancelled, "Pending timers cleared");

        let teardowns: Vec<Teardown> = {
            let mut resources = self.inner.resources.lock().unwrap_or_else(|e| e.into_inner());
            resources.drain(..).collect()
        };
        tracing::info!(resources = teardowns.len(), "Tearing down resources");

        let tasks: Vec<_> = teardowns
            .into_iter()
            .map(|t| {
                let resource = t.resource;
                let handle = tokio::spawn((t.run)());
                (resource, handle)
            })
            .collect();
        let aborts: Vec<_> = tasks.iter().map(|(_, h)| h.abort_handle()).collect();

        let settle = join_all(tasks.into_iter().map(|(resource, handle)| async move {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => Err(BoxError::from(e)),
            };
            log_teardown(resource, result);
        }));

        let timed_out = tokio::time::timeout(self.inner.deadline, settle).await.is_err();
        let exit_code = if timed_out {
            for abort in aborts {
                abort.abort();
            }
            let err = OrchestratorError::ForcedTimeout(self.inner.deadline);
            tracing::error!(error = %err, reason = %reason, "Forcing exit before teardown completed");
            EXIT_FAILURE
        } else {
            tracing::info!(reason = %reason, elapsed = ?started.elapsed(), "Shutdown complete");
            reason.exit_code()
        };

        metrics::record_shutdown(started.elapsed(), timed_out);

        self.inner.outcome.send_replace(Some(ShutdownOutcome {
            reason,
            exit_code,
            timed_out,
        }));
        self.inner.exit.exit(exit_code);
    }
}

fn log_teardown(resource: String, result: Result<(), BoxError>) {
    match result {
        Ok(()) => tracing::info!(resource = %resource, "Resource closed"),
        Err(source) => {
            let err = OrchestratorError::TeardownFailure { resource, source };
            tracing::error!(error = %err, "Teardown failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[derive(Default)]
    struct RecordingExit {
        codes: Mutex<Vec<i32>>,
    }

    impl ProcessExit for RecordingExit {
        fn exit(&self, code: i32) {
            self.codes.lock().unwrap().push(code);
        }
    }

    fn coordinator(deadline: Duration) -> (Shutdown, Arc<TimerRegistry>, Arc<RecordingExit>) {
        let timers = TimerRegistry::new();
        let exit = Arc::new(RecordingExit::default());
        let shutdown = Shutdown::new(timers.clone(), deadline, exit.clone());
        (shutdown, timers, exit)
    }

    #[test]
    fn test_exit_codes_follow_reason() {
        assert_eq!(ShutdownReason::Signal(Signal::Terminate).exit_code(), 0);
        assert_eq!(ShutdownReason::Signal(Signal::Quit).exit_code(), 0);
        assert_eq!(ShutdownReason::StartupFailure { action: "cache".into() }.exit_code(), 1);
        assert_eq!(ShutdownReason::Panic("boom".into()).exit_code(), 1);
        assert_eq!(
            ShutdownReason::DependencyUnreachable { dependency: "database".into(), target: "db".into() }
                .exit_code(),
            1
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_trigger_is_noop() {
        let (shutdown, _timers, exit) = coordinator(Duration::from_secs(10));
        let closes = Arc::new(AtomicUsize::new(0));
        let c = closes.clone();
        shutdown.register("pool", move || async move {
            c.fetch_add(1, Ordering::SeqCst);
            Ok::<(), BoxError>(())
        });

        assert!(shutdown.trigger(ShutdownReason::Signal(Signal::Interrupt)));
        assert!(!shutdown.trigger(ShutdownReason::Forced("again".into())));

        let outcome = shutdown.wait().await;
        assert_eq!(outcome.reason, ShutdownReason::Signal(Signal::Interrupt));
        assert_eq!(outcome.exit_code, 0);
        assert_eq!(closes.load(Ordering::SeqCst), 1);
        assert_eq!(*exit.codes.lock().unwrap(), vec![0]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_forces_failure_exit() {
        let (shutdown, _timers, exit) = coordinator(Duration::from_secs(2));
        shutdown.register("stuck", || async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok::<(), BoxError>(())
        });

        shutdown.trigger(ShutdownReason::Signal(Signal::Terminate));
        let outcome = shutdown.wait().await;
        assert!(outcome.timed_out);
        assert_eq!(outcome.exit_code, 1);
        assert_eq!(*exit.codes.lock().unwrap(), vec![1]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_teardown_does_not_block_others() {
        let (shutdown, _timers, _exit) = coordinator(Duration::from_secs(10));
        let closed = Arc::new(AtomicUsize::new(0));
        shutdown.register("broker", || async { Err::<(), BoxError>("connection reset".into()) });
        let c = closed.clone();
        shutdown.register("pool", move || async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            c.fetch_add(1, Ordering::SeqCst);
            Ok::<(), BoxError>(())
        });

        shutdown.trigger(ShutdownReason::Signal(Signal::Terminate));
        let outcome = shutdown.wait().await;
        assert!(!outcome.timed_out);
        assert_eq!(outcome.exit_code, 0);
        assert_eq!(closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_trigger_clears_timers_and_notifies_subscribers() {
        let (shutdown, timers, _exit) = coordinator(Duration::from_secs(10));
        let mut rx = shutdown.subscribe();
        timers.schedule("database-monitor", Duration::from_secs(30), async {});
        assert_eq!(timers.len(), 1);

        shutdown.trigger(ShutdownReason::Forced("test".into()));
        assert!(rx.recv().await.is_ok());
        let outcome = shutdown.wait().await;
        assert_eq!(outcome.exit_code, 1);
        assert!(timers.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_registration_is_torn_down_immediately() {
        let (shutdown, _timers, _exit) = coordinator(Duration::from_secs(10));
        shutdown.register("hook", || async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<(), BoxError>(())
        });
        shutdown.trigger(ShutdownReason::Signal(Signal::Terminate));
        tokio::time::sleep(Duration::from_secs(1)).await;

        let closes = Arc::new(AtomicUsize::new(0));
        let c = closes.clone();
        shutdown.register("pool", move || async move {
            c.fetch_add(1, Ordering::SeqCst);
            Ok::<(), BoxError>(())
        });
        assert_eq!(shutdown.resource_count(), 0);

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(closes.load(Ordering::SeqCst), 1);
        assert_eq!(shutdown.wait().await.exit_code, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_teardowns_run_concurrently() {
        let (shutdown, _timers, _exit) = coordinator(Duration::from_secs(3));
        for name in ["pool", "broker", "listener"] {
            shutdown.register(name, || async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                Ok::<(), BoxError>(())
            });
        }
        let start = Instant::now();
        shutdown.trigger(ShutdownReason::Signal(Signal::Interrupt));
        let outcome = shutdown.wait().await;
        assert!(!outcome.timed_out);
        assert!(start.elapsed() < Duration::from_secs(3));
    }
}
