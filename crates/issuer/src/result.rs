//! Declarative issuance outcomes.

use serde::{Serialize, Serializer};

use falcon_catalog::Tier;
use falcon_license::License;

use crate::error::IssueError;

/// Outcome of a generation attempt.
///
/// Expected failures (non-licensing event, duplicate payment, missing
/// identity) come back through this shape with `success == false` so
/// webhook handlers can acknowledge the delivery without exception
/// plumbing. The error stays typed in memory and serializes as its
/// catalog message.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub success: bool,
    /// The issued license, on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<License>,
    pub tier: Tier,
    /// Expiry as epoch milliseconds (0 on failure)
    pub expires_at: i64,
    pub user_id: String,
    pub generated_at: i64,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "error_message")]
    pub error: Option<IssueError>,
}

impl GenerationResult {
    /// Successful outcome wrapping an issued license
    pub fn issued(license: License) -> Self {
        Self {
            success: true,
            tier: license.tier,
            expires_at: license.expires_at,
            user_id: license.user_id.clone(),
            generated_at: license.generated_at,
            license: Some(license),
            error: None,
        }
    }

    /// Declarative failure outcome
    pub fn failure(tier: Tier, user_id: &str, generated_at: i64, error: IssueError) -> Self {
        Self {
            success: false,
            license: None,
            tier,
            expires_at: 0,
            user_id: user_id.to_string(),
            generated_at,
            error: Some(error),
        }
    }

    /// The issued key string, on success
    pub fn key(&self) -> Option<&str> {
        self.license.as_ref().map(|license| license.key.as_str())
    }

    /// The typed error, on failure
    pub fn error(&self) -> Option<&IssueError> {
        self.error.as_ref()
    }
}

fn error_message<S: Serializer>(
    error: &Option<IssueError>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match error {
        Some(error) => serializer.serialize_str(&error.to_string()),
        None => serializer.serialize_none(),
    }
}
