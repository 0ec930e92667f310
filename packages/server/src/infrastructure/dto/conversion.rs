//! Conversion logic between DTOs and domain entities.
//!
//! ## 設計ノート
//!
//! JSON の数値 id は文字列表現で `UserId::Number` に保持する。
//! `1` と `1.0` のように同じ整数値を表す表記は同じ id に正規化する。

use presence_relay_shared::time::timestamp_to_jst_rfc3339;
use serde_json::{Number, Value};

use crate::domain::{ConnectedUser, UserId};
use crate::infrastructure::dto::{
    DtoError,
    http::{DirectoryDto, DirectoryEntryDto},
    websocket::OnlineUser,
};

// ========================================
// DTO → Domain
// ========================================

impl TryFrom<&Value> for UserId {
    type Error = DtoError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(s) => Ok(UserId::text(s.clone())),
            Value::Number(n) => Ok(UserId::number(canonical_number(n))),
            Value::Null => Err(DtoError::UnsupportedUserId("null")),
            Value::Bool(_) => Err(DtoError::UnsupportedUserId("a boolean")),
            Value::Array(_) => Err(DtoError::UnsupportedUserId("an array")),
            Value::Object(_) => Err(DtoError::UnsupportedUserId("an object")),
        }
    }
}

/// 2^53: above this an f64 no longer represents every integer exactly.
const MAX_EXACT_F64_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Canonical text of a JSON number used as a user id.
///
/// Integral floats within the exact f64 range are written as integers,
/// so `1.0`, `1e0` and `1` all map to `"1"` (and `-0.0` to `"0"`).
fn canonical_number(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < MAX_EXACT_F64_INTEGER => {
            // f is integral and within i64 range here
            (f as i64).to_string()
        }
        _ => n.to_string(),
    }
}

/// Routing key of a `sendMessage` payload.
pub fn recipient_of(payload: &Value) -> Result<UserId, DtoError> {
    let recipient = payload
        .get("recipientId")
        .ok_or(DtoError::MissingRecipient)?;
    UserId::try_from(recipient)
}

// ========================================
// Domain → DTO
// ========================================

impl From<&UserId> for Value {
    fn from(user_id: &UserId) -> Self {
        match user_id {
            UserId::Text(s) => Value::String(s.clone()),
            UserId::Number(n) => n
                .parse::<Number>()
                .map(Value::Number)
                .unwrap_or_else(|_| Value::String(n.clone())),
        }
    }
}

impl From<&ConnectedUser> for OnlineUser {
    fn from(user: &ConnectedUser) -> Self {
        Self {
            user_id: Value::from(&user.user_id),
            connection_id: user.connection_id.to_string(),
        }
    }
}

impl From<&ConnectedUser> for DirectoryEntryDto {
    fn from(user: &ConnectedUser) -> Self {
        Self {
            user_id: Value::from(&user.user_id),
            connection_id: user.connection_id.to_string(),
            connected_at: timestamp_to_jst_rfc3339(user.connected_at.value()),
        }
    }
}

pub fn online_users(snapshot: &[ConnectedUser]) -> Vec<OnlineUser> {
    snapshot.iter().map(OnlineUser::from).collect()
}

pub fn directory_dto(snapshot: &[ConnectedUser], open_connections: usize) -> DirectoryDto {
    DirectoryDto {
        open_connections,
        users: snapshot.iter().map(DirectoryEntryDto::from).collect(),
    }
}
