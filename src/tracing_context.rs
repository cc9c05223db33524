//! Delivery ids and tracing spans
//!
//! Every delivery attempt gets its own id so that the request, the outcome and
//! any wrapping layer's logs can be correlated.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;
use tracing::Span;

/// Global counter for generating sequential delivery ids
static DELIVERY_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Identifies one delivery attempt
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeliveryId(String);

impl DeliveryId {
    /// Generate a new delivery id using timestamp and counter
    pub fn new() -> Self {
        let timestamp = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;

        let counter = DELIVERY_COUNTER.fetch_add(1, Ordering::SeqCst);

        // Format: timestamp-counter for readability and uniqueness
        DeliveryId(format!("{}-{}", timestamp, counter))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for DeliveryId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DeliveryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Span wrapping a single delivery attempt
pub fn delivery_span(delivery_id: &DeliveryId, endpoint: &str, event_count: usize) -> Span {
    tracing::info_span!(
        "event_delivery",
        delivery_id = %delivery_id,
        endpoint = endpoint,
        event_count = event_count,
        component = "regnotify"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delivery_id_generation() {
        let id1 = DeliveryId::new();
        let id2 = DeliveryId::new();

        assert_ne!(id1, id2);
        assert!(!id1.as_str().is_empty());
        assert!(id1.as_str().contains('-'));
    }

    #[test]
    fn test_delivery_span_builds_without_subscriber() {
        let id = DeliveryId::new();
        let span = delivery_span(&id, "http://hook/", 3);
        let _guard = span.enter();
    }
}
