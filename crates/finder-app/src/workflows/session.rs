//! Session Workflow - startup resolution, login, registration, logout.

use crate::router::{landing_screen, Navigation, Screen};
use crate::runtime_bridge::{Credentials, Registration};
use crate::session::SessionSnapshot;
use crate::workflows::runtime::handles;
use crate::workflows::state_helpers::{expire_session, with_core};
use crate::AppCore;
use async_lock::RwLock;
use finder_core::{AuthFailure, FinderError};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Resolve the persisted session, then release any navigation parked while
/// resolution was running.
///
/// The authoritative fetch runs without the core lock held.
#[instrument(skip(app_core))]
pub async fn initialize(
    app_core: &Arc<RwLock<AppCore>>,
) -> Result<(SessionSnapshot, Option<Navigation>), FinderError> {
    let h = handles(app_core).await;
    let outcome = h.session.initialize(h.api.as_ref()).await;

    let snapshot = h.session.snapshot();
    let resumed = with_core(app_core, |core| core.router_mut().resume(&snapshot)).await;
    outcome.map(|()| (snapshot, resumed))
}

/// Sign in and navigate to the landing screen.
///
/// Returns the screen now on display: Admin for administrators (when
/// configured), Home otherwise.
#[instrument(skip(app_core, credentials), fields(username = %credentials.username))]
pub async fn login(
    app_core: &Arc<RwLock<AppCore>>,
    credentials: &Credentials,
) -> Result<Screen, FinderError> {
    if credentials.username.trim().is_empty() {
        return Err(FinderError::validation("username", "Username is required"));
    }
    if credentials.password.is_empty() {
        return Err(FinderError::validation("password", "Password is required"));
    }

    let h = handles(app_core).await;
    let _guard = h.inflight.begin("login")?;

    let grant = h.api.login(credentials).await?;
    if grant.token.trim().is_empty() {
        return Err(FinderError::auth(
            AuthFailure::MissingToken,
            "login response carried no token",
        ));
    }
    let user = grant.user.clone();
    h.session.login(grant.user, grant.token).await?;
    info!(user_id = %user.user_id, "signed in");

    let screen = with_core(app_core, |core| {
        let landing = landing_screen(&user, core.config().admin_landing);
        core.navigate(landing).shown().unwrap_or(landing)
    })
    .await;
    Ok(screen)
}

/// Register a new account.
///
/// Every registration asks for the ordinary user role; role assignment is
/// left to the server.
#[instrument(skip(app_core, registration), fields(username = %registration.username))]
pub async fn register(
    app_core: &Arc<RwLock<AppCore>>,
    registration: &Registration,
) -> Result<(), FinderError> {
    validate_registration(registration)?;

    let h = handles(app_core).await;
    let _guard = h.inflight.begin("register")?;
    h.api.register(registration).await?;
    info!("account registered");
    Ok(())
}

/// Sign out, drop per-user state and show the login screen.
#[instrument(skip(app_core))]
pub async fn logout(app_core: &Arc<RwLock<AppCore>>) -> Result<Navigation, FinderError> {
    let h = handles(app_core).await;
    let cleared = h.session.logout().await;
    let navigation = with_core(app_core, |core| {
        core.clear_personal_state();
        core.navigate(Screen::Login)
    })
    .await;
    info!("signed out");
    cleared.map(|()| navigation)
}

/// Re-fetch the signed-in identity after a profile change.
#[instrument(skip(app_core))]
pub async fn refresh_identity(app_core: &Arc<RwLock<AppCore>>) -> Result<(), FinderError> {
    let h = handles(app_core).await;
    let token = h.session.token().ok_or_else(|| {
        FinderError::auth(AuthFailure::NotSignedIn, "no session to refresh")
    })?;
    match h.api.current_user(&token).await {
        Ok(user) => h.session.update(user).await,
        Err(e @ FinderError::Auth { .. }) => {
            if let Err(cleared) = expire_session(app_core).await {
                warn!(error = %cleared, "session storage could not be cleared");
            }
            Err(e)
        }
        Err(e) => Err(e),
    }
}

/// Field checks for the sign-up form.
pub fn validate_registration(registration: &Registration) -> Result<(), FinderError> {
    let required = [
        ("username", &registration.username, "Username is required"),
        ("password", &registration.password, "Password is required"),
        ("fName", &registration.first_name, "First name is required"),
        ("lName", &registration.last_name, "Last name is required"),
        ("email", &registration.email, "Email is required"),
        ("contactNo", &registration.contact_no, "Contact number is required"),
    ];
    for (field, value, message) in required {
        if value.trim().is_empty() {
            return Err(FinderError::validation(field, message));
        }
    }
    if !registration.email.contains('@') {
        return Err(FinderError::validation("email", "Enter a valid email address"));
    }
    Ok(())
}
