//! Core module containing fundamental types and configurations
//!
//! This module provides the basic building blocks for regnotify,
//! including endpoint configuration and error handling.

pub mod config;
pub mod errors;

// Re-export for convenience
pub use config::EndpointConfig;
pub use errors::{NotificationError, NotifyResult};
