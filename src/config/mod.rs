// Configuration module entry point
// Manages application configuration and runtime state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{Config, LoggingConfig};

/// Directory holding every stored file, fixed for the process lifetime
pub const STORAGE_ROOT: &str = "./uploads";

impl Config {
    /// Load configuration from specified file path (without extension)
    /// Default config file is "config.toml" when no path specified
    ///
    /// Environment overrides use the `SERVER_` prefix and `__` between
    /// sections, e.g. `SERVER_SERVER__PORT=9000`.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("SERVER")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_default("server.host", types::DEFAULT_HOST)?
            .set_default("server.port", i64::from(types::DEFAULT_PORT))?
            .set_default("logging.level", types::DEFAULT_LOG_LEVEL)?
            .set_default("logging.access_log", true)?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.read_timeout", types::DEFAULT_TIMEOUT_SECS)?
            .set_default("performance.write_timeout", types::DEFAULT_TIMEOUT_SECS)?
            .set_default("http.server_name", types::DEFAULT_SERVER_NAME)?
            .set_default("http.max_body_size", types::DEFAULT_MAX_BODY_SIZE)?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}
