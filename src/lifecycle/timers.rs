//! Named, cancelable timers.
//!
//! Every delayed or recurring piece of work the orchestrator schedules (the
//! health monitor loops) lives here under a name, so the shutdown coordinator
//! can cancel all of it in one sweep.

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use dashmap::DashMap;
use tokio::task::JoinHandle;

struct TimerEntry {
    id: u64,
    handle: JoinHandle<()>,
}

/// Registry mapping timer names to their scheduled tasks.
#[derive(Default)]
pub struct TimerRegistry {
    timers: DashMap<String, TimerEntry>,
    next_id: AtomicU64,
    closed: AtomicBool,
}

impl TimerRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Run `fut` after `delay` under `name`. Returns false, dropping `fut`,
    /// once [`cancel_all`](Self::cancel_all) has closed the registry.
    ///
    /// Scheduling over an existing name cancels the previous timer. The entry
    /// removes itself once `fut` completes.
    pub fn schedule<F>(self: &Arc<Self>, name: &str, delay: Duration, fut: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.is_closed() {
            tracing::warn!(timer = name, "Registry closed, timer not scheduled");
            return false;
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let registry: Weak<Self> = Arc::downgrade(self);
        let key = name.to_string();

        let handle = tokio::spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            fut.await;
            if let Some(registry) = registry.upgrade() {
                registry.timers.remove_if(&key, |_, entry| entry.id == id);
            }
        });

        tracing::debug!(timer = name, delay = ?delay, "Timer scheduled");
        if let Some(previous) = self.timers.insert(name.to_string(), TimerEntry { id, handle }) {
            previous.handle.abort();
            tracing::debug!(timer = name, "Replaced pending timer");
        }

        // cancel_all may have swept between the check above and the insert.
        if self.is_closed() {
            if let Some((_, entry)) = self.timers.remove_if(name, |_, entry| entry.id == id) {
                entry.handle.abort();
            }
            return false;
        }
        true
    }

    /// Run a long-lived loop under `name` (cancelable like any timer).
    pub fn spawn<F>(self: &Arc<Self>, name: &str, fut: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.schedule(name, Duration::ZERO, fut)
    }

    /// True once [`cancel_all`](Self::cancel_all) has run.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Cancel one timer. Returns true if it was still pending.
    pub fn cancel(&self, name: &str) -> bool {
        match self.timers.remove(name) {
            Some((_, entry)) => {
                let pending = !entry.handle.is_finished();
                entry.handle.abort();
                pending
            }
            None => false,
        }
    }

    /// Cancel every timer and refuse new ones. Returns how many were still pending.
    pub fn cancel_all(&self) -> usize {
        self.closed.store(true, Ordering::SeqCst);
        let names: Vec<String> = self.timers.iter().map(|e| e.key().clone()).collect();
        names.iter().filter(|name| self.cancel(name)).count()
    }

    /// Number of timers that have not yet fired or finished.
    pub fn len(&self) -> usize {
        self.timers.iter().filter(|e| !e.value().handle.is_finished()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, name: &str) -> bool {
        self.timers
            .get(name)
            .map(|e| !e.handle.is_finished())
            .unwrap_or(false)
    }
}
