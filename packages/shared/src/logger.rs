//! Logging setup for the presence relay.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Build the default filter directive for the relay crates and the running binary.
///
/// Crate names use `-` in Cargo but `_` as tracing targets.
pub fn default_directive(binary_name: &str, default_log_level: &str) -> String {
    format!(
        "{}={level},{}={level},{}={level},tower_http={level}",
        env!("CARGO_PKG_NAME").replace('-', "_"),
        "presence_relay_server",
        binary_name.replace('-', "_"),
        level = default_log_level,
    )
}

/// Initialize the tracing subscriber with the specified default log level.
///
/// The level can be overridden with the `RUST_LOG` environment variable.
///
/// # Examples
///
/// ```no_run
/// use presence_relay_shared::logger::setup_logger;
///
/// setup_logger("presence-relay-server", "debug");
/// ```
pub fn setup_logger(binary_name: &str, default_log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_directive(binary_name, default_log_level).into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
