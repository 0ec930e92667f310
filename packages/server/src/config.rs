//! Command-line and environment configuration.
//!
//! ## 設計ノート
//!
//! 全てのフラグは対応する `RELAY_*` 環境変数でも指定できる。
//! 両方指定された場合はコマンドラインが優先される。

use axum::http::{HeaderValue, header::InvalidHeaderValue};
use clap::Parser;

use crate::domain::DuplicatePolicy;

#[derive(Parser, Debug, Clone)]
#[command(name = "presence-relay-server", version)]
#[command(about = "Realtime presence and point-to-point relay over WebSocket", long_about = None)]
pub struct Config {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "RELAY_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "RELAY_PORT", default_value_t = 5000)]
    pub port: u16,

    /// What to do when a second connection announces an id that is already online
    /// ("ignore-duplicate" or "upsert")
    #[arg(long, env = "RELAY_DUPLICATE_POLICY", default_value_t = DuplicatePolicy::IgnoreDuplicate)]
    pub duplicate_policy: DuplicatePolicy,

    /// Origin allowed to call the HTTP endpoints from a browser
    #[arg(long, env = "RELAY_CORS_ORIGIN", default_value = "http://localhost:5173")]
    pub cors_origin: String,

    /// Default log level, overridden by RUST_LOG
    #[arg(long, env = "RELAY_LOG_LEVEL", default_value = "debug")]
    pub log_level: String,
}

impl Config {
    pub fn cors_origin_header(&self) -> Result<HeaderValue, InvalidHeaderValue> {
        HeaderValue::from_str(&self.cors_origin)
    }
}
