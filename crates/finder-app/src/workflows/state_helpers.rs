//! AppCore read-modify-write helpers for workflows.

use std::sync::Arc;

use async_lock::RwLock;
use finder_core::{AuthFailure, FinderError};
use tracing::{debug, info, warn};

use crate::router::{Screen, ViewTicket};
use crate::AppCore;

/// Apply `update` only if `ticket` still names the view on display.
///
/// Returns `None` when the result arrived for a view the user has left.
pub(crate) async fn apply_if_current<T>(
    app_core: &Arc<RwLock<AppCore>>,
    ticket: &ViewTicket,
    operation: &str,
    update: impl FnOnce(&mut AppCore) -> T,
) -> Option<T> {
    let mut core = app_core.write().await;
    if core.router().is_current(ticket) {
        Some(update(&mut *core))
    } else {
        debug!(
            operation,
            screen = %ticket.screen(),
            "dropping result for a view that is no longer shown"
        );
        None
    }
}

/// Apply `update` unconditionally.
pub(crate) async fn with_core<T>(
    app_core: &Arc<RwLock<AppCore>>,
    update: impl FnOnce(&mut AppCore) -> T,
) -> T {
    let mut core = app_core.write().await;
    update(&mut *core)
}

/// Pass a bridge result through, ending the session first when the server
/// no longer accepts the stored credential.
pub(crate) async fn recover_auth<T>(
    app_core: &Arc<RwLock<AppCore>>,
    result: Result<T, FinderError>,
) -> Result<T, FinderError> {
    if let Err(
        e @ FinderError::Auth {
            reason: AuthFailure::InvalidToken,
            ..
        },
    ) = &result
    {
        info!(error = %e, "credential no longer accepted; signing out");
        if let Err(cleared) = expire_session(app_core).await {
            warn!(error = %cleared, "session storage could not be cleared");
        }
    }
    result
}

/// Drop the session and per-user caches, then show the login screen.
///
/// Navigation happens even when clearing durable storage fails; that
/// failure is returned afterwards.
pub(crate) async fn expire_session(app_core: &Arc<RwLock<AppCore>>) -> Result<(), FinderError> {
    let session = app_core.read().await.session().clone();
    let cleared = session.logout().await;
    with_core(app_core, |core| {
        core.clear_personal_state();
        core.navigate(Screen::Login);
    })
    .await;
    cleared
}
