//! WebSocket connection handlers.
//!
//! ## 責務
//!
//! - WebSocket のアップグレードと、接続ごとの読み込み・書き込みタスクの管理
//! - 受信フレームのデコードと UseCase への振り分け
//!
//! ## 設計ノート
//!
//! 接続のライフサイクルは `Opened`（アップグレード時）→ `Identified`（最初の
//! `addNewUser`）→ `Closed`（どちらかのタスクが終了）。1 つの接続のイベントは
//! 読み込みタスクが到着順に処理する。
//!
//! 終了時は読み込みタスクを先に止めてから切断処理を行う。これにより、
//! その接続自身の announce が切断処理と交差することはない。

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, StreamExt},
};
use serde_json::Value;
use tokio::sync::mpsc;

use crate::{
    domain::{OpenConnection, UserId},
    infrastructure::dto::{
        conversion::recipient_of,
        websocket::{ClientEvent, ServerEvent},
    },
    ui::state::AppState,
    usecase::Delivery,
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Drains the connection's outbound channel into the WebSocket.
///
/// Ends when the socket write fails or the channel is closed.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (sender, mut receiver) = socket.split();

    let (tx, rx) = mpsc::unbounded_channel();
    let connection = state.connect_client_usecase.execute(tx).await;
    let connection_id = connection.id;

    let state_clone = state.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::warn!("WebSocket error on connection '{}': {}", connection.id, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    handle_text(&state_clone, &connection, text.as_str()).await;
                }
                Message::Binary(_) => {
                    tracing::warn!(
                        "Ignoring binary frame from connection '{}'",
                        connection.id
                    );
                }
                Message::Close(_) => {
                    tracing::info!("Connection '{}' requested close", connection.id);
                    break;
                }
                // Ping/pong is answered by axum
                Message::Ping(_) | Message::Pong(_) => {}
            }
        }
    });

    let mut send_task = pusher_loop(rx, sender);

    let reader_finished = tokio::select! {
        _ = &mut recv_task => true,
        _ = &mut send_task => false,
    };
    if !reader_finished {
        recv_task.abort();
        // Wait until no event of this connection is in flight
        let _ = recv_task.await;
    }

    let removed = state
        .disconnect_client_usecase
        .execute(&connection_id)
        .await;
    tracing::debug!(
        "Connection '{}' closed, directory sent to {} connection(s)",
        connection_id,
        removed.delivered
    );

    send_task.abort();
}

async fn handle_text(state: &AppState, connection: &OpenConnection, text: &str) {
    let event = match ClientEvent::from_json(text) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!(
                "Ignoring malformed frame from connection '{}': {}",
                connection.id,
                e
            );
            return;
        }
    };

    match event {
        ClientEvent::AddNewUser(raw) => match UserId::try_from(&raw) {
            Ok(user_id) => announce(state, connection, user_id).await,
            Err(e) => {
                tracing::warn!(
                    "Ignoring addNewUser from connection '{}': {}",
                    connection.id,
                    e
                );
            }
        },
        ClientEvent::SendMessage(payload) => relay(state, connection, payload).await,
    }
}

async fn announce(state: &AppState, connection: &OpenConnection, user_id: UserId) {
    let announced = state
        .announce_identity_usecase
        .execute(connection, user_id)
        .await;
    tracing::debug!(
        "Directory sent to {} connection(s) after announce on '{}'",
        announced.delivered,
        connection.id
    );
}

async fn relay(state: &AppState, connection: &OpenConnection, payload: Value) {
    let recipient = match recipient_of(&payload) {
        Ok(recipient) => recipient,
        Err(e) => {
            tracing::debug!(
                "Dropping message from connection '{}': {}",
                connection.id,
                e
            );
            return;
        }
    };

    let json = match ServerEvent::GetMessage(payload).to_json() {
        Ok(json) => json,
        Err(e) => {
            tracing::error!("Failed to encode getMessage: {}", e);
            return;
        }
    };

    match state.send_message_usecase.execute(&recipient, &json).await {
        Delivery::Delivered(target) => {
            tracing::debug!(
                "Message from connection '{}' relayed to '{}'",
                connection.id,
                target
            );
        }
        Delivery::Dropped(reason) => {
            tracing::debug!(
                "Message from connection '{}' to {} dropped: {:?}",
                connection.id,
                recipient,
                reason
            );
        }
    }
}
