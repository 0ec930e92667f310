//! Presence & relay server.
//!
//! Tracks which users are connected and relays point-to-point messages
//! between them over WebSocket.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin presence-relay-server
//! cargo run --bin presence-relay-server -- --host 0.0.0.0 --port 5000 --duplicate-policy upsert
//! ```

use std::{collections::HashMap, sync::Arc};

use clap::Parser;
use presence_relay_server::{
    config::Config,
    domain::Directory,
    infrastructure::{
        message_pusher::WebSocketMessagePusher, repository::InMemoryDirectoryRepository,
    },
    ui::Server,
    usecase::{
        AnnounceIdentityUseCase, ConnectClientUseCase, DisconnectClientUseCase,
        GetDirectoryUseCase, SendMessageUseCase,
    },
};
use presence_relay_shared::{logger::setup_logger, time::SystemClock};
use tokio::sync::Mutex;

#[tokio::main]
async fn main() {
    let config = Config::parse();

    setup_logger(env!("CARGO_BIN_NAME"), &config.log_level);

    let cors_origin = match config.cors_origin_header() {
        Ok(origin) => origin,
        Err(e) => {
            tracing::error!("Invalid CORS origin '{}': {}", config.cors_origin, e);
            std::process::exit(2);
        }
    };

    // 1. Repository (in-memory directory)
    let repository = Arc::new(InMemoryDirectoryRepository::new(Arc::new(Mutex::new(
        Directory::new(),
    ))));

    // 2. MessagePusher (WebSocket implementation)
    let message_pusher = Arc::new(WebSocketMessagePusher::new(Arc::new(Mutex::new(
        HashMap::new(),
    ))));

    // 3. UseCases
    let connect_client_usecase = Arc::new(ConnectClientUseCase::new(
        message_pusher.clone(),
        Arc::new(SystemClock),
    ));
    let announce_identity_usecase = Arc::new(AnnounceIdentityUseCase::new(
        repository.clone(),
        message_pusher.clone(),
        config.duplicate_policy,
    ));
    let send_message_usecase = Arc::new(SendMessageUseCase::new(
        repository.clone(),
        message_pusher.clone(),
    ));
    let disconnect_client_usecase = Arc::new(DisconnectClientUseCase::new(
        repository.clone(),
        message_pusher.clone(),
    ));
    let get_directory_usecase = Arc::new(GetDirectoryUseCase::new(
        repository.clone(),
        message_pusher.clone(),
    ));
    tracing::info!("Duplicate announce policy: {}", config.duplicate_policy);

    // 4. Server
    let server = Server::new(
        connect_client_usecase,
        announce_identity_usecase,
        send_message_usecase,
        disconnect_client_usecase,
        get_directory_usecase,
        cors_origin,
    );
    if let Err(e) = server.run(&config.host, config.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
