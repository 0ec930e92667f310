//! Data Transfer Objects (DTOs) for the relay.
//!
//! - `websocket`: event envelopes exchanged over the WebSocket
//! - `http`: HTTP API response DTOs
//! - `conversion`: DTO <-> domain conversion

pub mod conversion;
pub mod http;
pub mod websocket;

use thiserror::Error;

/// Failure to decode a frame received from a client.
#[derive(Debug, Error)]
pub enum DtoError {
    #[error("Invalid event frame: {0}")]
    InvalidFrame(#[from] serde_json::Error),

    #[error("User id must be a string or a number, got {0}")]
    UnsupportedUserId(&'static str),

    #[error("Message has no recipientId")]
    MissingRecipient,
}
