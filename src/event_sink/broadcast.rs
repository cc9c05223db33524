//! Fan-out sink delivering every batch to several destinations

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, info};

use super::Sink;
use crate::core::{NotificationError, NotifyResult};
use crate::types::Event;

/// Writes each batch to all of its sinks in turn.
///
/// Every sink is attempted even when an earlier one fails; the first error is
/// returned.
pub struct Broadcaster {
    sinks: Vec<Arc<dyn Sink>>,
    closed: AtomicBool,
}

impl Broadcaster {
    pub fn new(sinks: Vec<Arc<dyn Sink>>) -> Self {
        Self {
            sinks,
            closed: AtomicBool::new(false),
        }
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

#[async_trait]
impl Sink for Broadcaster {
    async fn write(&self, events: &[Event]) -> NotifyResult<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(NotificationError::SinkClosed);
        }

        let mut first_error: Option<NotificationError> = None;

        for (index, sink) in self.sinks.iter().enumerate() {
            if let Err(e) = sink.write(events).await {
                error!(sink = index, error = %e, "broadcast delivery failed");
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    async fn close(&self) -> NotifyResult<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Err(NotificationError::SinkClosed);
        }

        info!(sinks = self.sinks.len(), "closing broadcaster");
        let mut first_error: Option<NotificationError> = None;
        for sink in &self.sinks {
            if let Err(e) = sink.close().await {
                error!(error = %e, "error closing sink");
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Action, Target};
    use std::sync::atomic::AtomicUsize;

    struct CountingSink {
        count: AtomicUsize,
        fail: bool,
    }

    impl CountingSink {
        fn new(fail: bool) -> Self {
            Self {
                count: AtomicUsize::new(0),
                fail,
            }
        }

        fn count(&self) -> usize {
            self.count.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Sink for CountingSink {
        async fn write(&self, events: &[Event]) -> NotifyResult<()> {
            self.count.fetch_add(events.len(), Ordering::SeqCst);
            if self.fail {
                return Err(NotificationError::unexpected_status("counting", 500, "Internal Server Error"));
            }
            Ok(())
        }

        async fn close(&self) -> NotifyResult<()> {
            Ok(())
        }
    }

    fn events(n: usize) -> Vec<Event> {
        (0..n)
            .map(|_| Event::new(Action::Push, Target::new("layer", "library/test")))
            .collect()
    }

    #[tokio::test]
    async fn test_fans_out_to_all_sinks() {
        let sink1 = Arc::new(CountingSink::new(false));
        let sink2 = Arc::new(CountingSink::new(false));
        let broadcaster = Broadcaster::new(vec![
            sink1.clone() as Arc<dyn Sink>,
            sink2.clone() as Arc<dyn Sink>,
        ]);

        broadcaster.write(&events(3)).await.unwrap();

        assert_eq!(sink1.count(), 3);
        assert_eq!(sink2.count(), 3);
    }

    #[tokio::test]
    async fn test_failure_does_not_stop_fan_out() {
        let failing = Arc::new(CountingSink::new(true));
        let healthy = Arc::new(CountingSink::new(false));
        let broadcaster = Broadcaster::new(vec![
            failing.clone() as Arc<dyn Sink>,
            healthy.clone() as Arc<dyn Sink>,
        ]);

        let err = broadcaster.write(&events(2)).await.unwrap_err();

        assert_eq!(err.status_code(), Some(500));
        assert_eq!(failing.count(), 2);
        assert_eq!(healthy.count(), 2);
    }

    #[tokio::test]
    async fn test_close_is_strict() {
        let sink = Arc::new(CountingSink::new(false));
        let broadcaster = Broadcaster::new(vec![sink.clone() as Arc<dyn Sink>]);

        broadcaster.close().await.unwrap();
        assert!(broadcaster.close().await.unwrap_err().is_closed());
        assert!(broadcaster.write(&events(1)).await.unwrap_err().is_closed());
        assert_eq!(sink.count(), 0);
    }
}
