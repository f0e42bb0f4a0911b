//! Remote validation error types

use thiserror::Error;

/// Result type for remote validation
pub type Result<T> = std::result::Result<T, ValidateError>;

/// Outcomes of a failed remote verification
///
/// A `401` from the endpoint means the license expired; every other
/// non-2xx status and every transport failure is a distinct `Network`
/// outcome so callers can tell "your license is bad" from "we could not
/// check".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidateError {
    /// Key failed the local format precheck; never sent to the server
    #[error("Invalid license key format")]
    InvalidFormat,

    /// Endpoint answered 401: license expired
    #[error("License has expired")]
    Expired,

    /// Endpoint declared the license revoked
    #[error("License has been revoked")]
    Revoked,

    /// Endpoint declared the license invalid for another reason
    #[error("{reason}")]
    Rejected {
        /// Server-supplied catalog message
        reason: String,
    },

    /// Endpoint unreachable, timed out, or answered outside the contract
    #[error("Network error during verification")]
    Network {
        /// Transport or status detail for logs
        detail: String,
    },
}
