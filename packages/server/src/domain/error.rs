//! Domain error types.

use thiserror::Error;

/// Failure to push a frame to a single connection.
///
/// Always contained at the connection boundary; never reported to a client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("Connection '{0}' is not registered")]
    ConnectionNotFound(String),

    #[error("Failed to push to connection '{0}': receiver closed")]
    ReceiverClosed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown duplicate policy '{0}' (expected 'ignore-duplicate' or 'upsert')")]
pub struct UnknownDuplicatePolicy(pub String);
