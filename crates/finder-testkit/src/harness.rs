//! Test harness: an `AppCore` wired to the scripted backend.

use crate::fixtures;
use crate::mock_api::MockApi;
use async_lock::RwLock;
use finder_app::{workflows, AppConfig, AppCore, Credentials, Screen, SessionSnapshot};
use finder_core::{FinderError, MemoryStorage, StorageEffects, User};
use std::sync::Arc;

/// Application core plus handles on its backend and storage.
pub struct TestHarness {
    /// Shared core, as a frontend would hold it
    pub app_core: Arc<RwLock<AppCore>>,
    /// Scripted backend
    pub api: MockApi,
    /// Durable storage the session store writes to
    pub storage: Arc<dyn StorageEffects>,
}

impl TestHarness {
    /// Backend seeded with the fixture accounts and reference data, and
    /// empty in-memory storage.
    pub fn new() -> Self {
        Self::with_storage(Arc::new(MemoryStorage::new()))
    }

    /// Seeded backend over the given storage.
    pub fn with_storage(storage: Arc<dyn StorageEffects>) -> Self {
        Self::build(seeded_api(), storage, AppConfig::default())
    }

    /// Full control over every part.
    pub fn build(api: MockApi, storage: Arc<dyn StorageEffects>, config: AppConfig) -> Self {
        let app_core = AppCore::new(config, Arc::new(api.clone()), Arc::clone(&storage)).into_shared();
        Self {
            app_core,
            api,
            storage,
        }
    }

    /// Resolve the persisted session.
    pub async fn start(&self) -> Result<SessionSnapshot, FinderError> {
        workflows::initialize(&self.app_core)
            .await
            .map(|(snapshot, _)| snapshot)
    }

    /// Resolve the session, then sign in as `user` with the fixture password.
    pub async fn sign_in(&self, user: &User) -> Result<Screen, FinderError> {
        self.start().await?;
        let credentials = Credentials::new(user.username.clone(), fixtures::PASSWORD);
        workflows::login(&self.app_core, &credentials).await
    }

    /// Current session snapshot.
    pub async fn snapshot(&self) -> SessionSnapshot {
        self.app_core.read().await.snapshot()
    }

    /// Screen on display.
    pub async fn screen(&self) -> Screen {
        self.app_core.read().await.router().current()
    }

    /// Navigate like a user clicking a link.
    pub async fn navigate(&self, screen: Screen) -> Option<Screen> {
        self.app_core.write().await.navigate(screen).shown()
    }

    /// Raw stored value.
    pub async fn stored(&self, key: &str) -> Option<String> {
        self.storage.retrieve(key).await.ok().flatten()
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Backend with the fixture accounts and reference lists.
pub fn seeded_api() -> MockApi {
    let api = MockApi::new();
    api.add_account(fixtures::alice(), fixtures::PASSWORD)
        .add_account(fixtures::bob(), fixtures::PASSWORD)
        .add_account(fixtures::admin(), fixtures::PASSWORD)
        .seed_reference(fixtures::categories(), fixtures::departments());
    api
}
