//! Account model.

use serde::{Deserialize, Serialize};

/// A registered account. The API key scopes every bookmark, command and cache entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub name: String,
    #[serde(rename = "APIKey")]
    pub api_key: String,
    pub created_at: String,
}

/// Request body for creating a new account.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAccountRequest {
    pub name: String,
}
