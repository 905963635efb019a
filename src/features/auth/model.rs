use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Caller identity taken from a validated bearer token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    /// Token subject
    pub subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    pub roles: Vec<String>,
}
