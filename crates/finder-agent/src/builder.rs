//! Agent builder infrastructure.

use crate::config::AgentConfig;
use crate::http::HttpApi;
use crate::storage::FileStorage;
use anyhow::{Context, Result};
use async_lock::RwLock;
use finder_app::{workflows, ApiBridge, AppCore, SessionSnapshot};
use finder_core::StorageEffects;
use std::sync::Arc;
use tracing::{info, warn};

/// Builder for a ready-to-use application core.
///
/// Defaults to the HTTP backend and file storage described by the config;
/// either can be swapped for tests or embedded frontends.
pub struct AgentBuilder {
    config: AgentConfig,
    api: Option<Arc<dyn ApiBridge>>,
    storage: Option<Arc<dyn StorageEffects>>,
}

impl Default for AgentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentBuilder {
    /// Create a builder with default configuration
    pub fn new() -> Self {
        Self {
            config: AgentConfig::default(),
            api: None,
            storage: None,
        }
    }

    /// Set the configuration
    pub fn with_config(mut self, config: AgentConfig) -> Self {
        self.config = config;
        self
    }

    /// Use a custom backend bridge instead of HTTP
    pub fn with_api(mut self, api: Arc<dyn ApiBridge>) -> Self {
        self.api = Some(api);
        self
    }

    /// Use custom durable storage instead of files
    pub fn with_storage(mut self, storage: Arc<dyn StorageEffects>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Configuration the core will be built with.
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Assemble the shared core without touching the network.
    pub fn build(self) -> Result<Arc<RwLock<AppCore>>> {
        let api = match self.api {
            Some(api) => api,
            None => {
                let http = HttpApi::new(&self.config.api_base_url, self.config.request_timeout())
                    .with_context(|| {
                        format!("Failed to create client for {}", self.config.api_base_url)
                    })?;
                Arc::new(http) as Arc<dyn ApiBridge>
            }
        };
        let storage = self.storage.unwrap_or_else(|| {
            Arc::new(FileStorage::new(self.config.storage_path.clone())) as Arc<dyn StorageEffects>
        });
        info!(
            api = %self.config.api_base_url,
            storage = %self.config.storage_path.display(),
            "application core assembled"
        );
        Ok(AppCore::new(self.config.app, api, storage).into_shared())
    }

    /// Assemble the core and resolve the persisted session.
    ///
    /// A failed resolution is logged, not returned: the core is still usable
    /// with whatever identity survived.
    pub async fn start(self) -> Result<(Arc<RwLock<AppCore>>, SessionSnapshot)> {
        let app_core = self.build()?;
        let snapshot = match workflows::initialize(&app_core).await {
            Ok((snapshot, _)) => snapshot,
            Err(e) => {
                warn!(error = %e, "session resolution failed");
                app_core.read().await.snapshot()
            }
        };
        Ok((app_core, snapshot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use finder_core::MemoryStorage;

    #[tokio::test]
    async fn test_start_without_token_is_anonymous() {
        let storage = Arc::new(MemoryStorage::with_entries([("user", "{\"userId\":1}")]));
        let (app_core, snapshot) = AgentBuilder::new()
            .with_storage(storage.clone())
            .start()
            .await
            .unwrap();
        assert!(!snapshot.is_loading());
        assert!(snapshot.identity().is_none());
        assert!(storage.get("user").is_none());
        assert!(app_core.read().await.session().token().is_none());
    }

    #[tokio::test]
    async fn test_build_uses_configured_storage_path() {
        let dir = tempfile::tempdir().unwrap();
        let config = AgentConfig {
            storage_path: dir.path().join("session"),
            ..AgentConfig::default()
        };
        let builder = AgentBuilder::new().with_config(config);
        assert_eq!(builder.config().storage_path, dir.path().join("session"));
        let (_core, snapshot) = builder.start().await.unwrap();
        assert!(snapshot.identity().is_none());
    }
}
