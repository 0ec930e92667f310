//! UseCase layer: one use case per relay operation.

pub mod announce_identity;
pub mod connect_client;
pub mod disconnect_client;
pub mod get_directory;
pub mod send_message;

pub use announce_identity::{AnnounceIdentityUseCase, Announced};
pub use connect_client::ConnectClientUseCase;
pub use disconnect_client::{DisconnectClientUseCase, Removed};
pub use get_directory::{DirectoryView, GetDirectoryUseCase};
pub use send_message::{Delivery, DropReason, SendMessageUseCase};
