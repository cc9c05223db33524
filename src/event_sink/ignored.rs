//! Sink wrapper that drops events an endpoint does not want

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

use super::Sink;
use crate::core::{NotificationError, NotifyResult};
use crate::types::{Action, Event};

/// Filters events by action and target media type before handing the rest on.
///
/// Once closed, every write is rejected, including batches that would have
/// been filtered away entirely.
pub struct IgnoredSink<S> {
    inner: S,
    ignored_actions: HashSet<Action>,
    ignored_media_types: HashSet<String>,
    closed: AtomicBool,
}

impl<S: Sink> IgnoredSink<S> {
    pub fn new<A, M>(inner: S, ignored_actions: A, ignored_media_types: M) -> Self
    where
        A: IntoIterator<Item = Action>,
        M: IntoIterator<Item = String>,
    {
        Self {
            inner,
            ignored_actions: ignored_actions.into_iter().collect(),
            ignored_media_types: ignored_media_types.into_iter().collect(),
            closed: AtomicBool::new(false),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn is_ignored(&self, event: &Event) -> bool {
        if self.ignored_actions.contains(&event.action()) {
            return true;
        }
        event
            .target()
            .media_type
            .as_ref()
            .is_some_and(|media_type| self.ignored_media_types.contains(media_type))
    }
}

#[async_trait]
impl<S: Sink> Sink for IgnoredSink<S> {
    async fn write(&self, events: &[Event]) -> NotifyResult<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(NotificationError::SinkClosed);
        }
        if self.ignored_actions.is_empty() && self.ignored_media_types.is_empty() {
            return self.inner.write(events).await;
        }

        let kept: Vec<Event> = events
            .iter()
            .filter(|event| !self.is_ignored(event))
            .cloned()
            .collect();

        if kept.len() < events.len() {
            debug!(dropped = events.len() - kept.len(), "ignoring filtered events");
        }
        if kept.is_empty() {
            return Ok(());
        }

        self.inner.write(&kept).await
    }

    async fn close(&self) -> NotifyResult<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Err(NotificationError::SinkClosed);
        }
        self.inner.close().await
    }
}
