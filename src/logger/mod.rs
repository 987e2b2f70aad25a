//! Logger module
//!
//! Thin facade over `tracing` so call sites stay short:
//! - Server lifecycle logging
//! - Per-request access logging
//! - Storage error and warning logging

use crate::config::{Config, LoggingConfig};
use crate::storage::StoreError;
use hyper::{Method, Uri, Version};
use std::net::SocketAddr;
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Initialize the global subscriber
///
/// `RUST_LOG` takes precedence over `logging.level`. Should be called once at
/// application startup.
pub fn init(config: &LoggingConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))?;
    tracing_subscriber::fmt().with_env_filter(filter).try_init()
}

pub fn log_server_start(addr: &SocketAddr, config: &Config, storage_root: &Path) {
    tracing::info!(
        address = %addr,
        storage_root = %storage_root.display(),
        workers = ?config.server.workers,
        max_connections = ?config.performance.max_connections,
        max_body_size = config.http.max_body_size,
        "File server listening on http://{addr}"
    );
}

pub fn log_shutdown() {
    tracing::info!("Shutdown signal received, no longer accepting connections");
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    tracing::debug!(peer = %peer_addr, "Connection accepted");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    tracing::error!("Failed to serve connection: {err:?}");
}

pub fn log_request(method: &Method, uri: &Uri, version: Version) {
    tracing::info!("[Request] {method} {uri} {version:?}");
}

/// Entry log for every operation on a single file
pub fn log_file_request(method: &Method, name: &str) {
    tracing::info!(%method, name, "Got {method} request for file");
}

/// Storage failure that is answered with a 500 (or degraded listing entry)
pub fn log_store_error(action: &str, name: &str, err: &StoreError) {
    tracing::error!(action, name, error = %err, "Storage operation failed");
}

pub fn log_error(message: &str) {
    tracing::error!("{message}");
}

pub fn log_warning(message: &str) {
    tracing::warn!("{message}");
}
