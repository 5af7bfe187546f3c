//! Shared handler state.

use std::sync::Arc;

use credgate_core::CredentialGateway;

use crate::config::ServerConfig;

/// State cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    /// Registration and validation service.
    pub gateway: CredentialGateway,
    /// Loaded server configuration.
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Create state from a gateway and configuration.
    #[must_use]
    pub fn new(gateway: CredentialGateway, config: ServerConfig) -> Self {
        Self {
            gateway,
            config: Arc::new(config),
        }
    }
}
