//! Issuance error types

use thiserror::Error;

use falcon_license::LicenseError;
use falcon_webhooks::WebhookError;

/// Result type for issuance operations
pub type Result<T> = std::result::Result<T, IssueError>;

/// Errors that can occur while turning payment events into licenses
///
/// Display strings are the fixed user-facing message catalog. The
/// non-licensing event and duplicate-payment variants are expected
/// outcomes, not faults; they surface as declarative failures, never
/// panics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IssueError {
    /// Webhook event carried no usable identity
    #[error("User not found")]
    UserNotFound,

    /// Canonical event type does not trigger issuance (expected no-op)
    #[error("Event type does not require license generation")]
    EventNotLicensable,

    /// Ledger already holds this (provider, payment intent) pair
    #[error("License already issued for this payment")]
    DuplicatePayment,

    /// Generation request carried an empty user id
    #[error("Invalid user ID")]
    InvalidUserId,

    /// Generation request carried an implausible email
    #[error("Invalid email address")]
    InvalidEmail,

    /// Catch-all for unexpected runtime failures at the boundary
    #[error("Payment processing failed")]
    PaymentFailed,

    /// Provider signature or payload failure
    #[error(transparent)]
    Webhook(#[from] WebhookError),

    /// Key codec or signing failure
    #[error(transparent)]
    License(#[from] LicenseError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declarative_no_op_message() {
        assert_eq!(
            IssueError::EventNotLicensable.to_string(),
            "Event type does not require license generation"
        );
    }

    #[test]
    fn test_wrapped_errors_keep_their_catalog_message() {
        let err = IssueError::from(WebhookError::InvalidSignature);
        assert_eq!(err.to_string(), "Invalid webhook signature");

        let err = IssueError::from(LicenseError::InvalidFormat);
        assert_eq!(err.to_string(), "Invalid license key format");
    }
}
