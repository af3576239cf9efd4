//! Command models.
//!
//! Commands are a flat `cmd -> url` namespace per account, separate from the
//! path-addressed bookmarks.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// All commands registered for one account.
pub type CommandMap = BTreeMap<String, String>;

/// Request body for adding or updating a command.
#[derive(Debug, Clone, Deserialize)]
pub struct AddCmdRequest {
    pub cmd: String,
    pub url: String,
}

/// Response after adding or updating a command.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCmdResponse {
    pub cmds_set: u64,
    pub cmd: String,
    pub url: String,
}

/// Request body for deleting a command.
#[derive(Debug, Clone, Deserialize)]
pub struct DelCmdRequest {
    pub cmd: String,
}

/// Response after deleting a command.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelCmdResponse {
    pub num_deleted: u64,
    pub cmd: String,
}
