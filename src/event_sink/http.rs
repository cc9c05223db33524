use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, Url, redirect};
use tokio::sync::Mutex;
use tracing::{Instrument, debug, info, warn};

use std::sync::Arc;
use std::time::Duration;

use super::{Sink, StatusListener};

use crate::core::{NotificationError, NotifyResult};
use crate::tracing_context::{DeliveryId, delivery_span};
use crate::types::{EVENTS_MEDIA_TYPE, Envelope, Event};

/// Request timeout used when the caller passes a zero timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP event sink delivering each batch to one endpoint in a single POST.
///
/// The sink makes exactly one attempt per `write` and reports the outcome to its
/// listener; retrying is left to whatever wraps it.
pub struct HttpSink {
    url: Url,
    headers: HeaderMap,
    listener: Arc<dyn StatusListener>,
    /// Per-request bound, applied on top of whatever the client sets
    timeout: Duration,
    /// `None` once the sink has been closed
    client: Mutex<Option<Client>>,
}

impl HttpSink {
    /// Create a new HTTP sink. No connection is made until the first write.
    ///
    /// A zero `timeout` selects [`DEFAULT_TIMEOUT`]; the timeout bounds every
    /// request, including those sent through a caller-supplied `client`.
    ///
    /// When `client` is `None` the sink builds its own client that does not
    /// follow redirects, so a 3xx is reported as an unexpected status. A supplied
    /// client should be built with `redirect::Policy::none()` for the same
    /// behaviour; if it follows a redirect anyway, the delivery is rejected as
    /// [`NotificationError::Redirected`] and counted as a failure.
    pub fn new(
        url: &str,
        timeout: Duration,
        client: Option<Client>,
        listener: Arc<dyn StatusListener>,
    ) -> NotifyResult<Self> {
        let url = parse_endpoint_url(url)?;
        let timeout = if timeout.is_zero() {
            DEFAULT_TIMEOUT
        } else {
            timeout
        };

        let client = match client {
            Some(client) => client,
            None => {
                Client::builder()
                    .timeout(timeout)
                    .redirect(redirect::Policy::none())
                    .build()
                    .map_err(|e| {
                        NotificationError::config(format!("failed to build HTTP client: {}", e))
                    })?
            }
        };

        Ok(Self {
            url,
            headers: HeaderMap::new(),
            listener,
            timeout,
            client: Mutex::new(Some(client)),
        })
    }

    /// Add static headers to every request. `Content-Type` is always the events
    /// media type and is dropped from `headers`.
    pub fn with_headers(mut self, mut headers: HeaderMap) -> Self {
        headers.remove(CONTENT_TYPE);
        self.headers = headers;
        self
    }

    /// Endpoint URL this sink posts to
    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn deliver(&self, client: Client, events: &[Event]) -> NotifyResult<()> {
        let outcome = Outcome::new(self.listener.as_ref(), events.len());

        let body = match serde_json::to_vec(&Envelope::new(events)) {
            Ok(body) => body,
            Err(e) => {
                outcome.failure();
                return Err(e.into());
            }
        };

        let response = client
            .post(self.url.clone())
            .headers(self.headers.clone())
            .header(CONTENT_TYPE, HeaderValue::from_static(EVENTS_MEDIA_TYPE))
            .timeout(self.timeout)
            .body(body)
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(e) => {
                outcome.failure();
                warn!(error = %e, timeout = e.is_timeout(), "error posting events");
                return Err(NotificationError::transport(self.url.as_str(), e));
            }
        };

        // Only a client that follows redirects can end up somewhere else.
        if response.url() != &self.url {
            outcome.failure();
            warn!(location = %response.url(), "endpoint redirected the delivery");
            return Err(NotificationError::redirected(
                self.url.as_str(),
                response.url().as_str(),
            ));
        }

        let status = response.status();
        let text = status.canonical_reason().unwrap_or("<unknown status code>");
        outcome.status(status.as_u16(), text);

        if status.is_success() {
            debug!(status = %status, "delivered events");
            Ok(())
        } else {
            warn!(status = %status, "endpoint rejected events");
            Err(NotificationError::unexpected_status(
                self.url.as_str(),
                status.as_u16(),
                text,
            ))
        }
    }
}

#[async_trait]
impl Sink for HttpSink {
    async fn write(&self, events: &[Event]) -> NotifyResult<()> {
        // The guard is released before the request goes out.
        let client = self
            .client
            .lock()
            .await
            .clone()
            .ok_or(NotificationError::SinkClosed)?;

        if events.is_empty() {
            return Ok(());
        }

        let delivery_id = DeliveryId::new();
        let span = delivery_span(&delivery_id, self.url.as_str(), events.len());
        self.deliver(client, events).instrument(span).await
    }

    async fn close(&self) -> NotifyResult<()> {
        match self.client.lock().await.take() {
            Some(client) => {
                drop(client);
                info!(endpoint = %self.url, "closed http sink");
                Ok(())
            }
            None => Err(NotificationError::SinkClosed),
        }
    }
}

impl std::fmt::Debug for HttpSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpSink").field("url", &self.url.as_str()).finish()
    }
}

/// Validate an endpoint URL; only http and https are accepted
pub fn parse_endpoint_url(url: &str) -> NotifyResult<Url> {
    let parsed = Url::parse(url)
        .map_err(|e| NotificationError::config(format!("invalid endpoint URL '{}': {}", url, e)))?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(NotificationError::config(format!(
            "unsupported endpoint URL scheme '{}', expected http or https",
            scheme
        ))),
    }
}

/// Reports one attempt's outcome to the listener exactly once.
///
/// If it is dropped unresolved, the write future was cancelled mid-flight and the
/// batch counts as a failure.
struct Outcome<'a> {
    listener: &'a dyn StatusListener,
    count: usize,
    resolved: bool,
}

impl<'a> Outcome<'a> {
    fn new(listener: &'a dyn StatusListener, count: usize) -> Self {
        Self {
            listener,
            count,
            resolved: false,
        }
    }

    fn status(mut self, code: u16, text: &str) {
        self.resolved = true;
        self.listener.on_status(code, text, self.count);
    }

    fn failure(mut self) {
        self.resolved = true;
        self.listener.on_failure(self.count);
    }
}

impl Drop for Outcome<'_> {
    fn drop(&mut self) {
        if !self.resolved {
            warn!(events = self.count, "delivery cancelled before completion");
            self.listener.on_failure(self.count);
        }
    }
}
