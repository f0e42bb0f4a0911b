//! Catalog error types

use thiserror::Error;

/// Result type for catalog operations
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Errors that can occur when resolving tiers and mappings
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// Tier name does not resolve in the catalog
    #[error("License tier not found")]
    UnknownTier(String),

    /// Product tier has no entry in a tier mapping
    #[error("product tier '{0}' is not covered by the mapping")]
    UnmappedProductTier(String),

    /// Product tier appears twice in a tier mapping
    #[error("product tier '{0}' is mapped more than once")]
    DuplicateMapping(String),

    /// Sentinel integer is neither -1 nor a valid count
    #[error("invalid limit value {0} (must be -1 or non-negative)")]
    InvalidLimit(i64),

    /// Sentinel integer is neither -1 nor a valid day count
    #[error("invalid duration {0} (must be -1 or at least 1 day)")]
    InvalidDuration(i64),
}
