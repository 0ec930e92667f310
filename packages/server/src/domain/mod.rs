//! Domain layer of the presence relay.
//!
//! Holds the directory model and the ports (`DirectoryRepository`,
//! `MessagePusher`) the use cases depend on. Infrastructure implements the
//! ports; the domain never depends on infrastructure.

pub mod entity;
pub mod error;
pub mod policy;
pub mod pusher;
pub mod repository;
pub mod value_object;

pub use entity::{AnnounceOutcome, ConnectedUser, Directory, OpenConnection};
pub use error::{MessagePushError, UnknownDuplicatePolicy};
pub use policy::DuplicatePolicy;
pub use pusher::{MessagePusher, PusherChannel};
#[cfg(test)]
pub use pusher::MockMessagePusher;
pub use repository::{DirectoryGuard, DirectoryRepository};
pub use value_object::{ConnectionId, Timestamp, UserId};
