//! Error types for the notification system.

use thiserror::Error;

/// Errors that can occur when sending notifications.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Channel is not configured
    #[error("Channel not configured: {0}")]
    NotConfigured(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Webhook answered with a non-success status
    #[error("Webhook returned {status}: {body}")]
    Rejected { status: u16, body: String },
}
