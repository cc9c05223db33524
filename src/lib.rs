//! regnotify - registry event notifications over HTTP
//!
//! Delivers batches of registry lifecycle events (push, pull, delete, mount) to
//! HTTP endpoints and keeps per-endpoint delivery metrics.
//!
//! ```text
//! [producer] --events--> [Endpoint] --> [IgnoredSink] --> [HttpSink] --POST--> [subscriber]
//!                                                             |
//!                                             [StatusListener] --> [SafeMetrics]
//! ```

pub mod core;
pub mod endpoint;
pub mod event_sink;
pub mod metrics;
pub mod tracing_context;
pub mod types;

#[cfg(test)]
mod test_server;

pub use crate::core::{EndpointConfig, NotificationError, NotifyResult};
pub use endpoint::Endpoint;
pub use event_sink::{
    Broadcaster, EndpointMetricsHttpStatusListener, HttpSink, IgnoredSink, NoopStatusListener,
    Sink, StatusListener,
};
pub use metrics::{EndpointMetrics, SafeMetrics};
pub use types::{Action, Actor, EVENTS_MEDIA_TYPE, Envelope, Event, RequestRecord, Source, Target};
