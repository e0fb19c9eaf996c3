//! Profile Workflow - the signed-in user's summary page.

use crate::authorization::require_authenticated;
use crate::workflows::runtime::handles;
use crate::workflows::state_helpers::{apply_if_current, recover_auth};
use crate::AppCore;
use async_lock::RwLock;
use finder_core::{Claim, FinderError, Item, User};
use std::sync::Arc;
use tracing::instrument;

/// Data shown on the profile screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileSummary {
    /// Signed-in identity
    pub user: User,
    /// "First M. Last"
    pub display_name: String,
    /// Avatar initials
    pub initials: String,
    /// "Admin" / "User"
    pub display_role: String,
    /// Own reports still LOST or FOUND
    pub active_reports: Vec<Item>,
    /// Claims the user filed
    pub claims_made: Vec<Claim>,
}

impl ProfileSummary {
    /// Assemble the summary from fetched lists.
    pub fn new(user: User, my_items: Vec<Item>, claims_made: Vec<Claim>) -> Self {
        Self {
            display_name: user.full_name(),
            initials: user.initials(),
            display_role: user.display_role(),
            active_reports: my_items
                .into_iter()
                .filter(|i| i.status.is_open())
                .collect(),
            claims_made,
            user,
        }
    }
}

/// Load the profile summary; both lists are fetched concurrently.
#[instrument(skip(app_core))]
pub async fn load_profile(
    app_core: &Arc<RwLock<AppCore>>,
) -> Result<ProfileSummary, FinderError> {
    let h = handles(app_core).await;
    let user = require_authenticated(&h.snapshot, "Viewing your profile")?.clone();

    let fetched = futures::try_join!(
        h.api.items_by_user(user.user_id),
        h.api.claims_by_user(user.user_id)
    );
    let (items, claims) = recover_auth(app_core, fetched).await?;

    let (cached_items, cached_claims) = (items.clone(), claims.clone());
    apply_if_current(app_core, &h.ticket, "load_profile", move |core| {
        core.items_mut().set_mine(cached_items);
        core.claims_mut().set_made(cached_claims);
    })
    .await;
    Ok(ProfileSummary::new(user, items, claims))
}
