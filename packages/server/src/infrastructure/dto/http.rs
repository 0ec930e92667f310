//! HTTP API response DTOs.

use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryDto {
    /// Open WebSocket connections, announced or not.
    pub open_connections: usize,
    pub users: Vec<DirectoryEntryDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryEntryDto {
    pub user_id: Value,
    pub connection_id: String,
    /// RFC 3339 (JST)
    pub connected_at: Option<String>,
}
