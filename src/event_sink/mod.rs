//! Event sink foundation for registry notifications
//! Provides pluggable architecture for delivering event batches to various destinations

use crate::core::NotifyResult;
use crate::types::Event;
use async_trait::async_trait;

pub mod broadcast;
pub mod http;
pub mod ignored;
pub mod listener;

/// Sink trait shared by the HTTP transport and the layers that wrap it.
///
/// A closed sink rejects writes, and closing it a second time is an error.
#[async_trait]
pub trait Sink: Send + Sync {
    /// Deliver a batch of events, in order, as a single unit
    async fn write(&self, events: &[Event]) -> NotifyResult<()>;

    /// Release held resources; fails if already closed
    async fn close(&self) -> NotifyResult<()>;
}

pub use broadcast::Broadcaster;
pub use http::HttpSink;
pub use ignored::IgnoredSink;
pub use listener::{EndpointMetricsHttpStatusListener, NoopStatusListener, StatusListener};
