//! Server execution logic.
//!
//! ## 責務
//!
//! - ルーティング（`/ws`, `/api/health`, `/debug/directory`）と CORS / トレースのレイヤー設定
//! - TCP リスナーへのバインドとグレースフルシャットダウン

use std::{future::Future, sync::Arc};

use axum::{
    Router,
    http::{HeaderValue, Method},
    routing::get,
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::usecase::{
    AnnounceIdentityUseCase, ConnectClientUseCase, DisconnectClientUseCase, GetDirectoryUseCase,
    SendMessageUseCase,
};

use super::{
    handler::{debug_directory, health_check, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// Presence & relay server
///
/// # Example
///
/// ```ignore
/// let server = Server::new(
///     connect_client_usecase,
///     announce_identity_usecase,
///     send_message_usecase,
///     disconnect_client_usecase,
///     get_directory_usecase,
///     HeaderValue::from_static("http://localhost:5173"),
/// );
/// server.run("127.0.0.1", 5000).await?;
/// ```
pub struct Server {
    state: Arc<AppState>,
    cors_origin: HeaderValue,
}

impl Server {
    pub fn new(
        connect_client_usecase: Arc<ConnectClientUseCase>,
        announce_identity_usecase: Arc<AnnounceIdentityUseCase>,
        send_message_usecase: Arc<SendMessageUseCase>,
        disconnect_client_usecase: Arc<DisconnectClientUseCase>,
        get_directory_usecase: Arc<GetDirectoryUseCase>,
        cors_origin: HeaderValue,
    ) -> Self {
        Self {
            state: Arc::new(AppState {
                connect_client_usecase,
                announce_identity_usecase,
                send_message_usecase,
                disconnect_client_usecase,
                get_directory_usecase,
            }),
            cors_origin,
        }
    }

    /// Build the router without binding a socket.
    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(self.cors_origin.clone())
            .allow_methods([Method::GET]);

        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/debug/directory", get(debug_directory))
            .layer(cors)
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Bind `host:port` and serve until Ctrl+C / SIGTERM.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound or serving fails.
    pub async fn run(self, host: &str, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let bind_addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&bind_addr).await?;

        tracing::info!("Presence relay listening on {}", listener.local_addr()?);
        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener, shutdown_signal()).await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
    }
}
