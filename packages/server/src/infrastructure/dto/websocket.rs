//! WebSocket event envelopes.
//!
//! Every text frame is `{"event": <name>, "data": <payload>}`.
//!
//! ## 設計ノート
//!
//! `sendMessage` のペイロードは `serde_json::Value` のまま中継する。
//! `recipientId` 以外のフィールドは解釈しない。

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::DtoError;

/// Events accepted from a client.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    /// Identity announcement; the payload is the raw user id.
    AddNewUser(Value),
    /// Message to relay; must carry `recipientId`, everything else is opaque.
    SendMessage(Value),
}

impl ClientEvent {
    pub fn from_json(text: &str) -> Result<Self, DtoError> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Events emitted to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    GetOnlineUsers(Vec<OnlineUser>),
    GetMessage(Value),
}

impl ServerEvent {
    pub fn to_json(&self) -> Result<String, DtoError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// One directory entry as seen by clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnlineUser {
    pub user_id: Value,
    pub connection_id: String,
}
