//! Error types for registry event delivery
//! Provides structured error handling using thiserror for better error reporting

use thiserror::Error;

/// Main error type for event notification delivery
#[derive(Error, Debug)]
pub enum NotificationError {
    /// Malformed endpoint URL, header or environment value
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// No response was received (connection refused, DNS, timeout, TLS)
    #[error("{endpoint}: error posting events: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// A response arrived but its status was not 2xx
    #[error("{endpoint}: response status {code} {text} unaccepted")]
    UnexpectedStatus {
        endpoint: String,
        code: u16,
        text: String,
    },

    /// The client followed a redirect away from the endpoint
    #[error("{endpoint}: delivery redirected to {location}")]
    Redirected { endpoint: String, location: String },

    /// Write or close attempted on a sink that is already closed
    #[error("sink is closed")]
    SinkClosed,

    /// Envelope encoding errors
    #[error("error marshaling event envelope")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for convenience
pub type NotifyResult<T> = std::result::Result<T, NotificationError>;

impl NotificationError {
    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a transport error for the given endpoint
    pub fn transport<S: Into<String>>(endpoint: S, source: reqwest::Error) -> Self {
        Self::Transport {
            endpoint: endpoint.into(),
            source,
        }
    }

    /// Create an unexpected status error for the given endpoint
    pub fn unexpected_status<S: Into<String>, T: Into<String>>(
        endpoint: S,
        code: u16,
        text: T,
    ) -> Self {
        Self::UnexpectedStatus {
            endpoint: endpoint.into(),
            code,
            text: text.into(),
        }
    }

    /// Create a redirected error for the given endpoint
    pub fn redirected<S: Into<String>, L: Into<String>>(endpoint: S, location: L) -> Self {
        Self::Redirected {
            endpoint: endpoint.into(),
            location: location.into(),
        }
    }

    /// Whether this error was raised because the sink had been closed
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::SinkClosed)
    }

    /// The HTTP status code, when the failure carries one
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::UnexpectedStatus { code, .. } => Some(*code),
            _ => None,
        }
    }
}
