//! Falcon remote validation client.
//!
//! Client applications hold a license key but not the master key, so
//! full verification happens against the hub's verification endpoint.
//! This crate wraps that call with the local format precheck, bounded
//! retries, and typed outcomes (`expired` ≠ `rejected` ≠ `network`).
//!
//! # Usage
//!
//! ```no_run
//! use falcon_client::{RemoteValidator, ValidatorConfig};
//!
//! # async fn check() -> Result<(), falcon_client::ValidateError> {
//! let validator = RemoteValidator::new(ValidatorConfig::new(
//!     "https://api.quantumfalcon.com/license/verify",
//! ))?;
//!
//! let summary = validator
//!     .verify("QF-PRO-4f2a9b1c8e3d-1732035600000", None)
//!     .await?;
//! println!("licensed tier: {}", summary.tier);
//! # Ok(())
//! # }
//! ```

mod error;
mod validator;

pub use error::{Result, ValidateError};
pub use validator::{DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT_SECS, RemoteValidator, ValidatorConfig};
