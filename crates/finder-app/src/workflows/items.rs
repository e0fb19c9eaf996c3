//! Item Workflow - Portable Business Logic
//!
//! Listing, reporting, editing, deleting and administrative status changes
//! for items. Reads that populate a view are dropped if the user navigated
//! away before they completed; mutation results update the shared caches
//! unconditionally since they describe committed server state.

use crate::authorization::{is_admin, require_admin, require_authenticated};
use crate::runtime_bridge::{ImageUpload, ItemUpdate, ReportForm};
use crate::views::{match_suggestions as suggest, ItemQuery, MatchSuggestion, ReferenceData};
use crate::workflows::runtime::handles;
use crate::workflows::state_helpers::{apply_if_current, recover_auth, with_core};
use crate::AppCore;
use async_lock::RwLock;
use chrono::NaiveDate;
use finder_core::{
    CategoryId, DepartmentId, FinderError, Item, ItemId, ItemStats, ItemStatus,
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

// ============================================================================
// Drafts
// ============================================================================

/// Report/edit form contents before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDraft {
    /// Item name
    pub title: String,
    /// Description
    pub description: String,
    /// Selected category
    pub category_id: Option<CategoryId>,
    /// Selected department
    pub department_id: Option<DepartmentId>,
    /// Date lost or found
    pub date_report: Option<NaiveDate>,
    /// LOST or FOUND
    pub status: ItemStatus,
    /// Optional photo (report only)
    pub image: Option<ImageUpload>,
}

impl Default for ItemDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            category_id: None,
            department_id: None,
            date_report: None,
            status: ItemStatus::Found,
            image: None,
        }
    }
}

impl ItemDraft {
    /// Draft pre-filled from an existing item, for the edit form.
    pub fn from_item(item: &Item) -> Self {
        Self {
            title: item.title.clone(),
            description: item.description.clone(),
            category_id: item.category_id,
            department_id: item.department_id,
            date_report: item.date_report,
            status: item.status,
            image: None,
        }
    }
}

/// A draft that passed validation, with its department resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedDraft {
    /// Trimmed title
    pub title: String,
    /// Trimmed description
    pub description: String,
    /// Known category
    pub category_id: CategoryId,
    /// Known department
    pub department_id: DepartmentId,
    /// Department display name, stored as the item's location
    pub location: String,
    /// Report date
    pub date_report: NaiveDate,
    /// LOST or FOUND
    pub status: ItemStatus,
}

/// Field checks that need no reference data.
pub fn check_draft_fields(draft: &ItemDraft) -> Result<(), FinderError> {
    if draft.title.trim().is_empty() {
        return Err(FinderError::validation("itemTitle", "Item name is required"));
    }
    if draft.description.trim().is_empty() {
        return Err(FinderError::validation("itemDesc", "Description is required"));
    }
    if draft.category_id.is_none() || draft.department_id.is_none() {
        return Err(FinderError::validation(
            "categoryId",
            "Please select both a category and a campus",
        ));
    }
    if draft.date_report.is_none() {
        return Err(FinderError::validation("dateReport", "Date is required"));
    }
    if !ItemStatus::REPORTABLE.contains(&draft.status) {
        return Err(FinderError::validation("status", "Status must be LOST or FOUND"));
    }
    Ok(())
}

/// Check a draft against the loaded reference data.
pub fn validate_draft(
    draft: &ItemDraft,
    reference: &ReferenceData,
) -> Result<ValidatedDraft, FinderError> {
    check_draft_fields(draft)?;
    let (Some(category_id), Some(department_id), Some(date_report)) =
        (draft.category_id, draft.department_id, draft.date_report)
    else {
        return Err(FinderError::validation(
            "categoryId",
            "Please select both a category and a campus",
        ));
    };
    let department = match (
        reference.category(category_id),
        reference.department(department_id),
    ) {
        (Some(_), Some(department)) => department,
        _ => {
            return Err(FinderError::validation(
                "categoryId",
                "Invalid category or campus selection. Please try again.",
            ))
        }
    };
    Ok(ValidatedDraft {
        title: draft.title.trim().to_string(),
        description: draft.description.trim().to_string(),
        category_id,
        department_id,
        location: department.name.clone(),
        date_report,
        status: draft.status,
    })
}

/// Success sentence for a new report.
pub fn reported_message(item: &Item) -> String {
    format!(
        "\"{}\" has been reported as {} at {}.",
        item.title,
        item.status.label(),
        item.location
    )
}

/// Answer to the "delete this item?" prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    /// User confirmed the irrevocable delete
    Confirmed,
    /// User backed out
    Declined,
}

// ============================================================================
// Reads
// ============================================================================

/// Fetch every item into the listing.
#[instrument(skip(app_core))]
pub async fn load_items(app_core: &Arc<RwLock<AppCore>>) -> Result<Vec<Item>, FinderError> {
    let h = handles(app_core).await;
    let items = recover_auth(app_core, h.api.list_items().await).await?;
    let applied = items.clone();
    apply_if_current(app_core, &h.ticket, "load_items", move |core| {
        core.items_mut().set_all(applied)
    })
    .await;
    Ok(items)
}

/// Filtered view of the loaded listing.
pub async fn list(app_core: &Arc<RwLock<AppCore>>, query: &ItemQuery) -> Vec<Item> {
    let core = app_core.read().await;
    core.items().list(query).into_iter().cloned().collect()
}

/// Dashboard counters.
///
/// Uses the stats endpoint when available, otherwise derives the counts from
/// the full listing.
#[instrument(skip(app_core))]
pub async fn load_stats(app_core: &Arc<RwLock<AppCore>>) -> Result<ItemStats, FinderError> {
    let h = handles(app_core).await;
    let (stats, listing) = match h.api.item_stats().await {
        Ok(stats) => (stats, None),
        Err(e) => {
            debug!(error = %e, "stats endpoint unavailable; deriving counts");
            let items = recover_auth(app_core, h.api.list_items().await).await?;
            (ItemStats::from_items(&items), Some(items))
        }
    };
    apply_if_current(app_core, &h.ticket, "load_stats", move |core| {
        core.items_mut().set_stats(stats);
        if let Some(items) = listing {
            core.items_mut().set_all(items);
        }
    })
    .await;
    Ok(stats)
}

/// Fetch the signed-in user's own reports.
#[instrument(skip(app_core))]
pub async fn load_my_items(app_core: &Arc<RwLock<AppCore>>) -> Result<Vec<Item>, FinderError> {
    let h = handles(app_core).await;
    let user = require_authenticated(&h.snapshot, "Viewing your reports")?.user_id;
    let items = recover_auth(app_core, h.api.items_by_user(user).await).await?;
    let applied = items.clone();
    apply_if_current(app_core, &h.ticket, "load_my_items", move |core| {
        core.items_mut().set_mine(applied)
    })
    .await;
    Ok(items)
}

/// Fetch categories and departments for the report form.
#[instrument(skip(app_core))]
pub async fn load_reference_data(
    app_core: &Arc<RwLock<AppCore>>,
) -> Result<ReferenceData, FinderError> {
    let h = handles(app_core).await;
    let fetched = futures::try_join!(h.api.categories(), h.api.departments());
    let (categories, departments) = recover_auth(app_core, fetched).await?;
    let reference = ReferenceData {
        categories,
        departments,
    };
    let cached = reference.clone();
    with_core(app_core, move |core| core.items_mut().set_reference(cached)).await;
    Ok(reference)
}

/// Reference data, fetched on first use.
async fn ensure_reference_data(
    app_core: &Arc<RwLock<AppCore>>,
) -> Result<ReferenceData, FinderError> {
    let cached = app_core.read().await.items().reference().clone();
    if cached.is_loaded() {
        Ok(cached)
    } else {
        load_reference_data(app_core).await
    }
}

/// Other users' FOUND items that may be one of the user's LOST items.
pub async fn match_suggestions(
    app_core: &Arc<RwLock<AppCore>>,
) -> Result<Vec<MatchSuggestion>, FinderError> {
    let core = app_core.read().await;
    let snapshot = core.snapshot();
    let user = require_authenticated(&snapshot, "Finding matches")?.user_id;
    Ok(suggest(core.items().mine(), core.items().all(), user))
}

// ============================================================================
// Mutations
// ============================================================================

/// File a new report.
///
/// The created item is prepended to the user's list, then the canonical
/// list is re-fetched. A failed re-fetch is logged; the report stands.
#[instrument(skip(app_core, draft), fields(title = %draft.title))]
pub async fn report_item(
    app_core: &Arc<RwLock<AppCore>>,
    draft: &ItemDraft,
) -> Result<Item, FinderError> {
    let h = handles(app_core).await;
    let user = require_authenticated(&h.snapshot, "Reporting an item")?.user_id;
    check_draft_fields(draft)?;
    let reference = ensure_reference_data(app_core).await?;
    let valid = validate_draft(draft, &reference)?;

    let _guard = h.inflight.begin("report-item")?;
    let form = ReportForm {
        title: valid.title,
        description: valid.description,
        location: valid.location,
        status: valid.status,
        user_id: user,
        category_id: valid.category_id,
        department_id: valid.department_id,
        date_report: valid.date_report,
        image: draft.image.clone(),
    };
    let created = recover_auth(app_core, h.api.report_item(&form).await).await?;
    info!(item_id = %created.item_id, "item reported");

    let head = created.clone();
    with_core(app_core, move |core| core.items_mut().prepend_mine(head)).await;

    match h.api.items_by_user(user).await {
        Ok(mut canonical) => {
            if !canonical.iter().any(|i| i.item_id == created.item_id) {
                canonical.insert(0, created.clone());
            }
            with_core(app_core, move |core| core.items_mut().set_mine(canonical)).await;
        }
        Err(e) => warn!(error = %e, "could not refresh reports after filing"),
    }
    Ok(created)
}

/// Edit one of the user's own reports.
///
/// Ownership is checked against the locally known item; the server remains
/// the final authority.
#[instrument(skip(app_core, draft))]
pub async fn edit_item(
    app_core: &Arc<RwLock<AppCore>>,
    item_id: ItemId,
    draft: &ItemDraft,
) -> Result<Item, FinderError> {
    let h = handles(app_core).await;
    let user = require_authenticated(&h.snapshot, "Editing an item")?.clone();
    let existing = app_core.read().await.items().item(item_id).cloned();
    if let Some(item) = &existing {
        if !item.is_reported_by(user.user_id) && !is_admin(Some(&user)) {
            return Err(FinderError::permission(
                "Only the reporter can edit this item",
            ));
        }
    }
    check_draft_fields(draft)?;
    let reference = ensure_reference_data(app_core).await?;
    let valid = validate_draft(draft, &reference)?;

    let _guard = h.inflight.begin(format!("edit-item:{item_id}"))?;
    let update = ItemUpdate {
        item_title: Some(valid.title),
        item_desc: Some(valid.description),
        location: Some(valid.location),
        status: Some(valid.status),
        user_id: Some(
            existing
                .as_ref()
                .and_then(|i| i.reporter_id)
                .unwrap_or(user.user_id),
        ),
        category_id: Some(valid.category_id),
        department_id: Some(valid.department_id),
        date_report: Some(valid.date_report),
        image_url: existing.as_ref().and_then(|i| i.image_url.clone()),
    };
    let updated = recover_auth(app_core, h.api.update_item(item_id, &update).await).await?;
    let applied = updated.clone();
    with_core(app_core, move |core| {
        core.items_mut().replace(&applied);
    })
    .await;
    Ok(updated)
}

/// Delete a report after explicit confirmation.
///
/// Returns `false` when the user declined; nothing is sent in that case.
#[instrument(skip(app_core))]
pub async fn delete_item(
    app_core: &Arc<RwLock<AppCore>>,
    item_id: ItemId,
    confirmation: Confirmation,
) -> Result<bool, FinderError> {
    if confirmation == Confirmation::Declined {
        return Ok(false);
    }
    let h = handles(app_core).await;
    require_authenticated(&h.snapshot, "Deleting an item")?;

    let _guard = h.inflight.begin(format!("delete-item:{item_id}"))?;
    recover_auth(app_core, h.api.delete_item(item_id).await).await?;
    with_core(app_core, |core| core.items_mut().remove(item_id)).await;
    info!(%item_id, "item deleted");
    Ok(true)
}

/// Administrative status change: `LOST|FOUND → CLAIMED|RETURNED`.
#[instrument(skip(app_core))]
pub async fn set_item_status(
    app_core: &Arc<RwLock<AppCore>>,
    item_id: ItemId,
    status: ItemStatus,
) -> Result<Item, FinderError> {
    let h = handles(app_core).await;
    require_admin(&h.snapshot, "Changing item status")?;

    let current = app_core
        .read()
        .await
        .items()
        .item(item_id)
        .map(|i| i.status)
        .ok_or_else(|| FinderError::not_found(format!("Item {item_id} is not loaded")))?;
    if !current.can_transition_to(status) {
        return Err(FinderError::validation(
            "status",
            format!("Cannot change a {} item to {}", current.label(), status.label()),
        ));
    }

    let _guard = h.inflight.begin(format!("item-status:{item_id}"))?;
    let outcome = h.api.update_item(item_id, &ItemUpdate::status(status)).await;
    let updated = recover_auth(app_core, outcome).await?;
    let applied = updated.clone();
    with_core(app_core, move |core| {
        core.items_mut().replace(&applied);
    })
    .await;
    info!(%item_id, %status, "item status changed");
    Ok(updated)
}
