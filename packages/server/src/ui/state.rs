//! Shared application state.

use std::sync::Arc;

use crate::usecase::{
    AnnounceIdentityUseCase, ConnectClientUseCase, DisconnectClientUseCase, GetDirectoryUseCase,
    SendMessageUseCase,
};

pub struct AppState {
    pub connect_client_usecase: Arc<ConnectClientUseCase>,
    pub announce_identity_usecase: Arc<AnnounceIdentityUseCase>,
    pub send_message_usecase: Arc<SendMessageUseCase>,
    pub disconnect_client_usecase: Arc<DisconnectClientUseCase>,
    pub get_directory_usecase: Arc<GetDirectoryUseCase>,
}
