//! Webhook error types

use thiserror::Error;

/// Result type for webhook operations
pub type Result<T> = std::result::Result<T, WebhookError>;

/// Errors that can occur while verifying and normalizing webhooks
///
/// Display strings stay on the fixed user-facing catalog; parse details
/// are carried separately and only surface in logs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WebhookError {
    /// Provider signature header missing, malformed, stale, or wrong
    #[error("Invalid webhook signature")]
    InvalidSignature,

    /// Payload did not match the provider's shape for a known event type
    #[error("Payment processing failed")]
    Malformed {
        /// Parse detail for logs, never shown to end users
        detail: String,
    },
}

impl WebhookError {
    /// Create a `Malformed` error with a log detail
    pub fn malformed(detail: impl Into<String>) -> Self {
        Self::Malformed {
            detail: detail.into(),
        }
    }

    /// The parse detail, if any
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Malformed { detail } => Some(detail),
            Self::InvalidSignature => None,
        }
    }
}
