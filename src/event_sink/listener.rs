//! Delivery outcome listeners
//!
//! A `StatusListener` is told how every delivery attempt ended. The HTTP sink
//! only knows this trait; what is done with the outcome is up to the listener.

use crate::metrics::SafeMetrics;

/// Observer invoked once after each delivery attempt
pub trait StatusListener: Send + Sync {
    /// A response was received with the given status
    fn on_status(&self, code: u16, text: &str, count: usize);

    /// No response was received at all
    fn on_failure(&self, count: usize);
}

/// Accumulates delivery outcomes into an endpoint's metrics
#[derive(Debug, Clone)]
pub struct EndpointMetricsHttpStatusListener {
    safe_metrics: SafeMetrics,
}

impl EndpointMetricsHttpStatusListener {
    pub fn new(safe_metrics: SafeMetrics) -> Self {
        Self { safe_metrics }
    }

    pub fn metrics(&self) -> &SafeMetrics {
        &self.safe_metrics
    }
}

impl StatusListener for EndpointMetricsHttpStatusListener {
    fn on_status(&self, code: u16, text: &str, count: usize) {
        let label = format!("{} {}", code, text);
        self.safe_metrics.update(|metrics| {
            if (200..300).contains(&code) {
                metrics.successes += count;
            } else {
                metrics.failures += count;
            }
            *metrics.statuses.entry(label).or_insert(0) += count;
        });
    }

    fn on_failure(&self, count: usize) {
        self.safe_metrics.update(|metrics| metrics.failures += count);
    }
}

/// Listener that discards every outcome
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopStatusListener;

impl StatusListener for NoopStatusListener {
    fn on_status(&self, _code: u16, _text: &str, _count: usize) {}

    fn on_failure(&self, _count: usize) {}
}
