//! # Session Store
//!
//! Single owner of "who is using this client right now". The identity and the
//! credential token live in three places: in memory, in durable storage and
//! on the server. This store is the only writer of the durable copy; every
//! other component reads the published [`SessionSnapshot`].
//!
//! ## Resolution phases
//!
//! ```text
//!   begin_initialize()                 finish_initialize(outcome)
//! ┌──────────────────────┐          ┌───────────────────────────────┐
//! │ Resolving            │          │ Ready                          │
//! │ identity: cached     │ ───────► │ Ok        → authoritative      │
//! │ source:   Cached     │          │ rejection → anonymous, cleared │
//! └──────────────────────┘          │ network   → cached kept        │
//!                                   └───────────────────────────────┘
//! ```
//!
//! Every login, logout and startup pass bumps a generation counter. A server
//! answer that arrives for an older generation is dropped, so a slow startup
//! check can never undo a login that finished first.
//!
//! The store is cheap to clone; clones share state, so workflows can take
//! one out of `AppCore` and await without holding the core lock.

use crate::authorization::is_admin;
use crate::runtime_bridge::ApiBridge;
use finder_core::{AuthFailure, FinderError, StorageEffects, User, UserId};
use futures_signals::signal::{Mutable, Signal};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Durable key holding the identity JSON.
pub const USER_KEY: &str = "user";
/// Durable key holding the opaque credential token.
pub const TOKEN_KEY: &str = "token";
/// Durable key holding the derived "authenticated" flag.
pub const AUTHENTICATED_KEY: &str = "isAuthenticated";

const SESSION_KEYS: [&str; 3] = [USER_KEY, TOKEN_KEY, AUTHENTICATED_KEY];

// ============================================================================
// Snapshot
// ============================================================================

/// Whether identity resolution has completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionPhase {
    /// Startup fetch still running; the gate must not redirect
    Resolving,
    /// Identity is settled (possibly absent)
    Ready,
}

/// Where the current identity came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentitySource {
    /// Read from durable storage, not yet confirmed by the server
    Cached,
    /// Returned by the server during this run
    Authoritative,
}

/// Published session state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Resolution phase
    pub phase: SessionPhase,
    /// Current identity, if any
    pub identity: Option<User>,
    /// Origin of `identity`; `None` when there is no identity
    pub source: Option<IdentitySource>,
    /// Whether a credential token is held
    pub has_token: bool,
}

impl SessionSnapshot {
    /// Snapshot during startup resolution.
    pub fn resolving(cached: Option<User>, has_token: bool) -> Self {
        let source = cached.as_ref().map(|_| IdentitySource::Cached);
        Self {
            phase: SessionPhase::Resolving,
            identity: cached,
            source,
            has_token,
        }
    }

    /// Resolved, nobody signed in.
    pub fn anonymous() -> Self {
        Self {
            phase: SessionPhase::Ready,
            identity: None,
            source: None,
            has_token: false,
        }
    }

    /// Resolved with a server-confirmed identity.
    pub fn signed_in(user: User) -> Self {
        Self {
            phase: SessionPhase::Ready,
            identity: Some(user),
            source: Some(IdentitySource::Authoritative),
            has_token: true,
        }
    }

    /// True until identity resolution completes.
    pub fn is_loading(&self) -> bool {
        self.phase == SessionPhase::Resolving
    }

    /// Current identity.
    pub fn identity(&self) -> Option<&User> {
        self.identity.as_ref()
    }

    /// Current user id.
    pub fn user_id(&self) -> Option<UserId> {
        self.identity.as_ref().map(|u| u.user_id)
    }

    /// Whether someone is signed in; `None` while still resolving.
    pub fn authenticated(&self) -> Option<bool> {
        match self.phase {
            SessionPhase::Resolving => None,
            SessionPhase::Ready => Some(self.identity.is_some()),
        }
    }

    /// Signed in with the administrator role.
    pub fn is_admin(&self) -> bool {
        is_admin(self.identity())
    }
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self::resolving(None, false)
    }
}

// ============================================================================
// Store
// ============================================================================

/// A startup resolution waiting for the server's answer.
#[derive(Clone, PartialEq, Eq)]
pub struct PendingResolution {
    token: String,
    generation: u64,
}

impl PendingResolution {
    /// Token to confirm with the server.
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl std::fmt::Debug for PendingResolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingResolution")
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

/// Session store shared by every view.
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn StorageEffects>,
    state: Mutable<SessionSnapshot>,
    token: Arc<Mutex<Option<String>>>,
    generation: Arc<AtomicU64>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("state", &self.state.get_cloned())
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Create a store over `storage`. The store starts out resolving.
    pub fn new(storage: Arc<dyn StorageEffects>) -> Self {
        Self {
            storage,
            state: Mutable::new(SessionSnapshot::default()),
            token: Arc::new(Mutex::new(None)),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.get_cloned()
    }

    /// Signal of snapshots for views that re-render on session changes.
    pub fn signal(&self) -> impl Signal<Item = SessionSnapshot> {
        self.state.signal_cloned()
    }

    /// Current credential token.
    pub fn token(&self) -> Option<String> {
        self.token.lock().clone()
    }

    /// Run the whole startup sequence against `api`.
    pub async fn initialize(&self, api: &dyn ApiBridge) -> Result<(), FinderError> {
        match self.begin_initialize().await? {
            Some(pending) => {
                let outcome = api.current_user(pending.token()).await;
                self.finish_initialize(pending, outcome).await
            }
            None => Ok(()),
        }
    }

    /// Phase one: publish the cached identity optimistically.
    ///
    /// Returns the resolution that needs an authoritative fetch. Without a
    /// token the session is settled immediately and `None` is returned. A
    /// storage read failure settles the session as anonymous in memory and
    /// leaves the durable copy untouched.
    pub async fn begin_initialize(&self) -> Result<Option<PendingResolution>, FinderError> {
        let generation = self.advance();
        let read = async {
            let user = self.storage.retrieve(USER_KEY).await?;
            let token = self.storage.retrieve(TOKEN_KEY).await?;
            Ok::<_, finder_core::StorageError>((user, token))
        }
        .await;
        let (cached_json, token) = match read {
            Ok(pair) => pair,
            Err(e) => {
                warn!(error = %e, "session storage unreadable; starting signed out");
                if self.is_current(generation) {
                    *self.token.lock() = None;
                    self.state.set(SessionSnapshot::anonymous());
                }
                return Err(e.into());
            }
        };
        if !self.is_current(generation) {
            debug!("session changed while reading storage; skipping resolution");
            return Ok(None);
        }

        let cached = cached_json.and_then(|json| match serde_json::from_str::<User>(&json) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!(error = %e, "discarding unreadable cached identity");
                None
            }
        });

        let Some(token) = token else {
            if cached.is_some() {
                debug!("cached identity has no token; clearing session");
            }
            *self.token.lock() = None;
            self.state.set(SessionSnapshot::anonymous());
            if let Err(e) = self.clear_storage().await {
                warn!(error = %e, "failed to clear stale session storage");
            }
            return Ok(None);
        };

        *self.token.lock() = Some(token.clone());
        self.state.set(SessionSnapshot::resolving(cached, true));
        Ok(Some(PendingResolution { token, generation }))
    }

    /// Phase two: reconcile with the server's answer.
    ///
    /// An explicit rejection clears identity and token. A transport failure
    /// keeps the cached identity, or clears the token when there is none.
    /// Answers for a superseded resolution are ignored.
    pub async fn finish_initialize(
        &self,
        pending: PendingResolution,
        outcome: Result<User, FinderError>,
    ) -> Result<(), FinderError> {
        if !self.is_current(pending.generation) {
            debug!("session changed during resolution; dropping server answer");
            return Ok(());
        }
        let has_cached = self.state.lock_ref().identity.is_some();
        match outcome {
            Ok(user) => {
                let json = serde_json::to_string(&user)?;
                let persisted = async {
                    self.storage.store(USER_KEY, &json).await?;
                    self.storage.store(AUTHENTICATED_KEY, "true").await
                }
                .await;
                if !self.is_current(pending.generation) {
                    debug!("session changed while persisting identity; dropping it");
                    return Ok(());
                }
                let mut snapshot = SessionSnapshot::signed_in(user);
                snapshot.has_token = self.token.lock().is_some();
                self.state.set(snapshot);
                persisted.map_err(FinderError::from)
            }
            Err(e) if e.is_rejection() => {
                info!(error = %e, "stored credential rejected; signing out");
                self.settle_signed_out().await
            }
            Err(e) if !has_cached => {
                warn!(error = %e, "could not confirm session and no identity is cached; signing out");
                self.settle_signed_out().await
            }
            Err(e) => {
                warn!(error = %e, "could not confirm session; keeping cached identity");
                self.state.lock_mut().phase = SessionPhase::Ready;
                Ok(())
            }
        }
    }

    /// Record a successful login.
    ///
    /// Durable storage is written first; memory changes only once all keys
    /// are stored.
    pub async fn login(&self, user: User, token: String) -> Result<(), FinderError> {
        if token.trim().is_empty() {
            return Err(FinderError::auth(
                AuthFailure::MissingToken,
                "login response carried no token",
            ));
        }
        let json = serde_json::to_string(&user)?;
        self.advance();
        let written = async {
            self.storage.store(USER_KEY, &json).await?;
            self.storage.store(TOKEN_KEY, &token).await?;
            self.storage.store(AUTHENTICATED_KEY, "true").await
        }
        .await;
        if let Err(e) = written {
            warn!(error = %e, "login could not be persisted; rolling back");
            if let Err(rollback) = self.restore_storage().await {
                warn!(error = %rollback, "rollback of partial login failed");
            }
            let snapshot = self.snapshot();
            if snapshot.is_loading() {
                if snapshot.identity.is_none() {
                    *self.token.lock() = None;
                    self.state.set(SessionSnapshot::anonymous());
                } else {
                    self.state.lock_mut().phase = SessionPhase::Ready;
                }
            }
            return Err(e.into());
        }

        *self.token.lock() = Some(token);
        self.state.set(SessionSnapshot::signed_in(user));
        Ok(())
    }

    /// Sign out. Memory is always cleared; a storage failure is reported.
    pub async fn logout(&self) -> Result<(), FinderError> {
        self.advance();
        self.settle_signed_out().await
    }

    /// Replace the identity after a profile edit, keeping the token.
    pub async fn update(&self, user: User) -> Result<(), FinderError> {
        if self.token.lock().is_none() {
            return Err(FinderError::auth(
                AuthFailure::NotSignedIn,
                "no session to update",
            ));
        }
        let json = serde_json::to_string(&user)?;
        self.storage.store(USER_KEY, &json).await?;
        let mut state = self.state.lock_mut();
        state.identity = Some(user);
        state.source = Some(IdentitySource::Authoritative);
        Ok(())
    }

    fn advance(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    async fn settle_signed_out(&self) -> Result<(), FinderError> {
        *self.token.lock() = None;
        self.state.set(SessionSnapshot::anonymous());
        self.clear_storage().await
    }

    /// Put the durable copy back in line with memory after a failed write.
    async fn restore_storage(&self) -> Result<(), FinderError> {
        let token = self.token.lock().clone();
        let identity = self.state.lock_ref().identity.clone();
        match (identity, token) {
            (Some(user), Some(token)) => {
                let json = serde_json::to_string(&user)?;
                self.storage.store(USER_KEY, &json).await?;
                self.storage.store(TOKEN_KEY, &token).await?;
                self.storage.store(AUTHENTICATED_KEY, "true").await?;
                Ok(())
            }
            _ => self.clear_storage().await,
        }
    }

    async fn clear_storage(&self) -> Result<(), FinderError> {
        let mut first_error = None;
        for key in SESSION_KEYS {
            if let Err(e) = self.storage.remove(key).await {
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }
}
