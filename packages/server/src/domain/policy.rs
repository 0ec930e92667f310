//! Policy applied when a second connection announces an identity that is
//! already present in the directory.

use std::{fmt, str::FromStr};

use super::error::UnknownDuplicatePolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Keep the first connection; the newcomer stays open but unregistered.
    #[default]
    IgnoreDuplicate,
    /// Rebind the identity to the newest connection.
    Upsert,
}

impl DuplicatePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IgnoreDuplicate => "ignore-duplicate",
            Self::Upsert => "upsert",
        }
    }
}

impl fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DuplicatePolicy {
    type Err = UnknownDuplicatePolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ignore-duplicate" | "ignore" => Ok(Self::IgnoreDuplicate),
            "upsert" => Ok(Self::Upsert),
            other => Err(UnknownDuplicatePolicy(other.to_string())),
        }
    }
}
