//! Configuration management for notification endpoints
//!
//! This module handles loading endpoint configuration from environment variables.
//! It provides a centralized way to manage endpoint settings with proper
//! validation and default values.

use super::{NotificationError, NotifyResult};
use crate::event_sink::http::parse_endpoint_url;
use crate::types::Action;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::env;
use std::time::Duration;

/// Configuration for one notification endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointConfig {
    pub name: String,
    pub url: String,
    /// Zero selects the sink's default timeout
    pub timeout: Duration,
    /// Static headers added to every request
    pub headers: Vec<(String, String)>,
    pub ignored_actions: Vec<Action>,
    pub ignored_media_types: Vec<String>,
}

impl EndpointConfig {
    /// Minimal configuration with defaults for everything but name and URL
    pub fn new<N: Into<String>, U: Into<String>>(name: N, url: U) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            timeout: Duration::ZERO,
            headers: Vec::new(),
            ignored_actions: Vec::new(),
            ignored_media_types: Vec::new(),
        }
    }

    /// Load configuration from environment variables
    ///
    /// # Environment Variables
    ///
    /// Required:
    /// - `NOTIFY_ENDPOINT_URL`: URL events are posted to (http:// or https://)
    ///
    /// Optional (with defaults):
    /// - `NOTIFY_ENDPOINT_NAME`: Endpoint name used in logs (default: "default")
    /// - `NOTIFY_TIMEOUT_MS`: Request timeout in milliseconds (default: 0, the sink default)
    /// - `NOTIFY_HEADERS`: Extra request headers as `Key=Value,Key2=Value2`
    /// - `NOTIFY_IGNORED_ACTIONS`: Comma separated actions never sent to this endpoint
    /// - `NOTIFY_IGNORED_MEDIA_TYPES`: Comma separated target media types never sent
    pub fn from_env() -> NotifyResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> NotifyResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup("NOTIFY_ENDPOINT_URL").ok_or_else(|| {
            NotificationError::config("Missing required NOTIFY_ENDPOINT_URL environment variable")
        })?;

        let name = lookup("NOTIFY_ENDPOINT_NAME").unwrap_or_else(|| "default".to_string());
        let timeout_ms = lookup("NOTIFY_TIMEOUT_MS");
        let headers = lookup("NOTIFY_HEADERS");
        let ignored_actions = lookup("NOTIFY_IGNORED_ACTIONS");
        let ignored_media_types = lookup("NOTIFY_IGNORED_MEDIA_TYPES");

        Self::validate_and_create(
            name,
            url,
            timeout_ms,
            headers,
            ignored_actions,
            ignored_media_types,
        )
    }

    /// Validate configuration parameters and create EndpointConfig
    fn validate_and_create(
        name: String,
        url: String,
        timeout_ms: Option<String>,
        headers: Option<String>,
        ignored_actions: Option<String>,
        ignored_media_types: Option<String>,
    ) -> NotifyResult<Self> {
        if name.trim().is_empty() {
            return Err(NotificationError::config("NOTIFY_ENDPOINT_NAME cannot be empty"));
        }

        if url.trim().is_empty() {
            return Err(NotificationError::config("NOTIFY_ENDPOINT_URL cannot be empty"));
        }
        parse_endpoint_url(url.trim())?;

        let timeout = match timeout_ms {
            Some(value) => {
                let millis = value.trim().parse::<u64>().map_err(|_| {
                    NotificationError::config(format!(
                        "NOTIFY_TIMEOUT_MS must be a whole number of milliseconds, got '{}'",
                        value
                    ))
                })?;
                Duration::from_millis(millis)
            }
            None => Duration::ZERO,
        };

        let headers = match headers {
            Some(value) => parse_header_pairs(&value)?,
            None => Vec::new(),
        };

        let ignored_actions = split_list(ignored_actions.as_deref())
            .map(|action| action.parse::<Action>())
            .collect::<NotifyResult<Vec<_>>>()?;

        let ignored_media_types = split_list(ignored_media_types.as_deref())
            .map(str::to_string)
            .collect();

        let config = Self {
            name: name.trim().to_string(),
            url: url.trim().to_string(),
            timeout,
            headers,
            ignored_actions,
            ignored_media_types,
        };

        // Reject header names or values reqwest would refuse later
        config.header_map()?;

        Ok(config)
    }

    /// Build the request headers for this endpoint
    pub fn header_map(&self) -> NotifyResult<HeaderMap> {
        let mut map = HeaderMap::new();
        for (key, value) in &self.headers {
            let name = HeaderName::from_bytes(key.as_bytes()).map_err(|_| {
                NotificationError::config(format!("invalid header name '{}'", key))
            })?;
            let value = HeaderValue::from_str(value).map_err(|_| {
                NotificationError::config(format!("invalid value for header '{}'", key))
            })?;
            map.append(name, value);
        }
        Ok(map)
    }

    /// Whether any filtering is configured
    pub fn has_ignore_rules(&self) -> bool {
        !self.ignored_actions.is_empty() || !self.ignored_media_types.is_empty()
    }
}

fn split_list(value: Option<&str>) -> impl Iterator<Item = &str> {
    value
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
}

fn parse_header_pairs(value: &str) -> NotifyResult<Vec<(String, String)>> {
    split_list(Some(value))
        .map(|pair| match pair.split_once('=') {
            Some((key, val)) if !key.trim().is_empty() => {
                Ok((key.trim().to_string(), val.trim().to_string()))
            }
            _ => Err(NotificationError::config(format!(
                "NOTIFY_HEADERS entries must look like Key=Value, got '{}'",
                pair
            ))),
        })
        .collect()
}
