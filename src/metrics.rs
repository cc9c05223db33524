//! Per-endpoint delivery metrics
//!
//! `EndpointMetrics` is a plain counter set; `SafeMetrics` is the shared,
//! lock-guarded handle that listeners update and exporters read.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Cumulative delivery outcome counters for one endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EndpointMetrics {
    /// Events submitted but not yet resolved; maintained by queueing layers
    pub pending: usize,
    /// Events whose request completed with a 2xx status
    pub successes: usize,
    /// Events whose request failed or got a non-2xx status
    pub failures: usize,
    /// Events per `"<code> <text>"` response status
    pub statuses: HashMap<String, usize>,
}

impl EndpointMetrics {
    /// Total events resolved either way
    pub fn resolved(&self) -> usize {
        self.successes + self.failures
    }

    /// Count recorded under a status label, zero when absent
    pub fn status_count(&self, label: &str) -> usize {
        self.statuses.get(label).copied().unwrap_or(0)
    }
}

/// Thread-safe handle around one `EndpointMetrics`
#[derive(Debug, Clone, Default)]
pub struct SafeMetrics {
    inner: Arc<Mutex<EndpointMetrics>>,
}

impl SafeMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run a read-modify-write under the lock
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut EndpointMetrics),
    {
        let mut metrics = self.lock();
        f(&mut metrics);
    }

    /// Consistent copy of the current counters
    pub fn snapshot(&self) -> EndpointMetrics {
        self.lock().clone()
    }

    // Counters stay meaningful even if a holder panicked mid-update.
    fn lock(&self) -> MutexGuard<'_, EndpointMetrics> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
