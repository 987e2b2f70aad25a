// Application state module
// Holds the loaded configuration and the storage handle shared by all requests

use std::sync::Arc;

use super::types::Config;
use crate::storage::FileStore;

/// Application state
///
/// Built once at startup and never mutated afterwards.
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn FileStore>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn FileStore>) -> Self {
        Self { config, store }
    }
}
