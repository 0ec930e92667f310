//! Realtime presence tracking and point-to-point message relay.
//!
//! Clients open a WebSocket, announce an identity, and exchange messages
//! addressed by identity. The relay keeps an in-memory directory of who is
//! online and pushes it to every connection whenever it changes.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;
