use classrelay_core::{Authenticator, Config, Registry, SanitizedConfig};
use std::sync::Arc;

/// Shared application state
pub struct AppState {
    config: Config,
    authenticator: Arc<dyn Authenticator>,
    registry: Arc<dyn Registry>,
}

impl AppState {
    pub fn new(
        config: Config,
        authenticator: Arc<dyn Authenticator>,
        registry: Arc<dyn Registry>,
    ) -> Self {
        Self {
            config,
            authenticator,
            registry,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn authenticator(&self) -> &dyn Authenticator {
        self.authenticator.as_ref()
    }

    pub fn registry(&self) -> &dyn Registry {
        self.registry.as_ref()
    }
}
