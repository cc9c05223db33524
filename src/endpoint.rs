//! Named notification endpoints
//!
//! An endpoint owns the metrics for one subscriber and the sink stack that
//! delivers to it: the HTTP transport, optionally behind an ignore filter.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use crate::core::{EndpointConfig, NotifyResult};
use crate::event_sink::{EndpointMetricsHttpStatusListener, HttpSink, IgnoredSink, Sink};
use crate::metrics::{EndpointMetrics, SafeMetrics};
use crate::types::Event;

pub struct Endpoint {
    name: String,
    url: String,
    metrics: SafeMetrics,
    sink: Box<dyn Sink>,
}

impl Endpoint {
    /// Build an endpoint from its configuration. Performs no network I/O.
    pub fn new(config: &EndpointConfig) -> NotifyResult<Self> {
        Self::with_client(config, None)
    }

    /// Like [`Endpoint::new`], but with a caller-supplied HTTP client
    pub fn with_client(
        config: &EndpointConfig,
        client: Option<reqwest::Client>,
    ) -> NotifyResult<Self> {
        let metrics = SafeMetrics::new();
        let listener = Arc::new(EndpointMetricsHttpStatusListener::new(metrics.clone()));

        let http = HttpSink::new(&config.url, config.timeout, client, listener)?
            .with_headers(config.header_map()?);

        let sink: Box<dyn Sink> = if config.has_ignore_rules() {
            Box::new(IgnoredSink::new(
                http,
                config.ignored_actions.iter().copied(),
                config.ignored_media_types.iter().cloned(),
            ))
        } else {
            Box::new(http)
        };

        info!(endpoint = %config.name, url = %config.url, "configured notification endpoint");

        Ok(Self {
            name: config.name.clone(),
            url: config.url.clone(),
            metrics,
            sink,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Consistent snapshot of this endpoint's delivery metrics
    pub fn read_metrics(&self) -> EndpointMetrics {
        self.metrics.snapshot()
    }
}

#[async_trait]
impl Sink for Endpoint {
    async fn write(&self, events: &[Event]) -> NotifyResult<()> {
        self.sink.write(events).await
    }

    async fn close(&self) -> NotifyResult<()> {
        self.sink.close().await
    }
}

impl std::fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Endpoint")
            .field("name", &self.name)
            .field("url", &self.url)
            .finish()
    }
}
