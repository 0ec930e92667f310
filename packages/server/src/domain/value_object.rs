//! Value objects of the presence domain.

use std::fmt;

use uuid::Uuid;

/// Application-level identity announced by a client.
///
/// The relay does not validate the format. Ids keep the JSON type they were
/// announced with, so the text `"1"` and the number `1` are different users.
/// Numbers are stored in canonical text form: `1.0` and `1` are the same user.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UserId {
    Text(String),
    /// Canonical decimal rendering of a JSON number.
    Number(String),
}

impl UserId {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn number(value: impl Into<String>) -> Self {
        Self::Number(value.into())
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Text(s) | Self::Number(s) => s,
        }
    }

    /// Empty or whitespace-only ids break the external contract but are still accepted.
    pub fn is_blank(&self) -> bool {
        self.as_str().trim().is_empty()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write!(f, "\"{s}\""),
            Self::Number(n) => f.write_str(n),
        }
    }
}

/// Transport-level identifier of one WebSocket connection. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Unix timestamp in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(millis: i64) -> Self {
        Self(millis)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}
