//! The application core: configuration plus every piece of client state.

use crate::core::inflight::InFlight;
use crate::errors::{user_message, ErrorCategory};
use crate::router::{Navigation, Screen, SidebarKind, ViewRouter};
use crate::runtime_bridge::ApiBridge;
use crate::session::{SessionSnapshot, SessionStore};
use crate::views::{ClaimsState, ItemsState, ToastLevel, ToastQueue};
use async_lock::RwLock;
use finder_core::{FinderError, StorageEffects};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Default toast lifetime.
pub const DEFAULT_TOAST_DURATION_MS: u64 = 5_000;

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// How long toasts stay visible
    pub toast_duration_ms: u64,
    /// Send administrators to the dashboard after login
    pub admin_landing: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            toast_duration_ms: DEFAULT_TOAST_DURATION_MS,
            admin_landing: true,
        }
    }
}

/// Portable application core.
///
/// Shared as `Arc<RwLock<AppCore>>`. Workflows copy out the handles they
/// need (bridge, session store, in-flight set), release the lock, await the
/// network and re-acquire the lock to apply results.
pub struct AppCore {
    config: AppConfig,
    api: Arc<dyn ApiBridge>,
    session: SessionStore,
    router: ViewRouter,
    items: ItemsState,
    claims: ClaimsState,
    toasts: ToastQueue,
    inflight: InFlight,
}

impl std::fmt::Debug for AppCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppCore")
            .field("config", &self.config)
            .field("session", &self.session)
            .field("router", &self.router)
            .finish_non_exhaustive()
    }
}

impl AppCore {
    /// Create a core over a backend bridge and durable storage.
    pub fn new(
        config: AppConfig,
        api: Arc<dyn ApiBridge>,
        storage: Arc<dyn StorageEffects>,
    ) -> Self {
        Self {
            config,
            api,
            session: SessionStore::new(storage),
            router: ViewRouter::default(),
            items: ItemsState::default(),
            claims: ClaimsState::default(),
            toasts: ToastQueue::new(),
            inflight: InFlight::new(),
        }
    }

    /// Wrap for sharing across tasks.
    pub fn into_shared(self) -> Arc<RwLock<AppCore>> {
        Arc::new(RwLock::new(self))
    }

    /// Configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Backend bridge.
    pub fn api(&self) -> Arc<dyn ApiBridge> {
        Arc::clone(&self.api)
    }

    /// Session store.
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Current session snapshot.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.session.snapshot()
    }

    /// View router.
    pub fn router(&self) -> &ViewRouter {
        &self.router
    }

    /// Mutable view router.
    pub fn router_mut(&mut self) -> &mut ViewRouter {
        &mut self.router
    }

    /// Item state.
    pub fn items(&self) -> &ItemsState {
        &self.items
    }

    /// Mutable item state.
    pub fn items_mut(&mut self) -> &mut ItemsState {
        &mut self.items
    }

    /// Claim state.
    pub fn claims(&self) -> &ClaimsState {
        &self.claims
    }

    /// Mutable claim state.
    pub fn claims_mut(&mut self) -> &mut ClaimsState {
        &mut self.claims
    }

    /// Toast queue.
    pub fn toasts(&self) -> &ToastQueue {
        &self.toasts
    }

    /// Mutable toast queue.
    pub fn toasts_mut(&mut self) -> &mut ToastQueue {
        &mut self.toasts
    }

    /// Outstanding mutating operations.
    pub fn inflight(&self) -> &InFlight {
        &self.inflight
    }

    /// Navigate under the current session.
    pub fn navigate(&mut self, screen: Screen) -> Navigation {
        let snapshot = self.session.snapshot();
        self.router.navigate(&snapshot, screen)
    }

    /// Navigation chrome for the screen on display.
    pub fn sidebar(&self) -> SidebarKind {
        self.router.sidebar(&self.session.snapshot())
    }

    /// Queue a toast with the configured lifetime.
    pub fn notify(
        &mut self,
        level: ToastLevel,
        title: Option<&str>,
        text: impl Into<String>,
        now_ms: u64,
    ) -> u64 {
        let duration = self.config.toast_duration_ms;
        self.toasts.push(level, title, text, now_ms, duration)
    }

    /// Queue the toast for a failed operation.
    pub fn notify_error(&mut self, error: &FinderError, now_ms: u64) -> u64 {
        let category = ErrorCategory::of(error);
        self.notify(
            category.toast_severity(),
            Some(category.label()),
            user_message(error),
            now_ms,
        )
    }

    /// Drop everything tied to the signed-in user.
    pub(crate) fn clear_personal_state(&mut self) {
        self.items.clear_personal();
        self.claims.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.toast_duration_ms, 5_000);
        assert!(config.admin_landing);

        let partial: AppConfig = serde_json::from_str(r#"{"admin_landing":false}"#).unwrap();
        assert_eq!(partial.toast_duration_ms, 5_000);
        assert!(!partial.admin_landing);
    }
}
