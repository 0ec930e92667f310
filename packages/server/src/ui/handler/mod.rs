mod http;
mod websocket;

pub use http::{debug_directory, health_check};
pub use websocket::websocket_handler;
