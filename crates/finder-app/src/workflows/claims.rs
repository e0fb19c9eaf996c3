//! Claim Workflow - Portable Business Logic
//!
//! Filing claims, aggregating claims received on the user's items, and the
//! approve/reject/verify decisions.

use crate::authorization::{is_admin, require_admin, require_authenticated};
use crate::views::ReceivedClaim;
use crate::workflows::runtime::handles;
use crate::workflows::state_helpers::{apply_if_current, recover_auth, with_core};
use crate::AppCore;
use async_lock::RwLock;
use finder_core::{Claim, ClaimId, FinderError, Item, ItemId, NewClaim, User};
use futures::future::join_all;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Reporter's decision on a pending claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    /// Accept the claim
    Approve,
    /// Refuse the claim
    Reject,
}

impl From<bool> for Decision {
    fn from(approve: bool) -> Self {
        if approve {
            Self::Approve
        } else {
            Self::Reject
        }
    }
}

/// Build a claim request, refusing it before any network traffic when the
/// claimant is missing, owns the item, or gave no verification answer.
pub fn prepare_claim(
    item: &Item,
    claimant: Option<&User>,
    verification_answer: &str,
    contact_info: Option<&str>,
) -> Result<NewClaim, FinderError> {
    let Some(claimant) = claimant else {
        return Err(FinderError::validation(
            "userId",
            "Please log in to claim items",
        ));
    };
    if item.is_reported_by(claimant.user_id) {
        return Err(FinderError::validation(
            "itemId",
            "You cannot claim your own item",
        ));
    }
    let answer = verification_answer.trim();
    if answer.is_empty() {
        return Err(FinderError::validation(
            "verificationAnswer",
            "Please provide verification details",
        ));
    }
    let contact = contact_info
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string);
    Ok(NewClaim::pending(item.item_id, claimant.user_id, answer, contact))
}

/// Flatten per-item claim fetches into one list, in item order.
///
/// A failed fetch contributes nothing; the failure is logged.
pub fn aggregate_received(
    fetched: Vec<(Item, Result<Vec<Claim>, FinderError>)>,
) -> Vec<ReceivedClaim> {
    let mut received = Vec::new();
    for (item, result) in fetched {
        match result {
            Ok(claims) => received.extend(claims.into_iter().map(|claim| ReceivedClaim {
                claim,
                item: item.clone(),
            })),
            Err(e) => warn!(item_id = %item.item_id, error = %e, "claims for item unavailable"),
        }
    }
    received
}

/// File a claim on another user's item.
#[instrument(skip(app_core, verification_answer, contact_info))]
pub async fn submit_claim(
    app_core: &Arc<RwLock<AppCore>>,
    item_id: ItemId,
    verification_answer: &str,
    contact_info: Option<&str>,
) -> Result<Claim, FinderError> {
    let h = handles(app_core).await;
    let item = app_core
        .read()
        .await
        .items()
        .item(item_id)
        .cloned()
        .ok_or_else(|| FinderError::not_found(format!("Item {item_id} is not loaded")))?;
    let request = prepare_claim(&item, h.snapshot.identity(), verification_answer, contact_info)?;

    let _guard = h.inflight.begin(format!("submit-claim:{item_id}"))?;
    let claim = recover_auth(app_core, h.api.submit_claim(&request).await).await?;
    info!(claim_id = %claim.claim_id, %item_id, "claim submitted");

    let applied = claim.clone();
    with_core(app_core, move |core| core.claims_mut().push_made(applied)).await;
    Ok(claim)
}

/// Claims received on every item the signed-in user reported.
///
/// Per-item failures are isolated; only failing to list the user's own items
/// fails the whole call.
#[instrument(skip(app_core))]
pub async fn list_received(
    app_core: &Arc<RwLock<AppCore>>,
) -> Result<Vec<ReceivedClaim>, FinderError> {
    let h = handles(app_core).await;
    let user = require_authenticated(&h.snapshot, "Viewing received claims")?.user_id;

    let items = recover_auth(app_core, h.api.items_by_user(user).await).await?;
    let fetches = items.iter().map(|item| h.api.claims_for_item(item.item_id));
    let results = join_all(fetches).await;
    let received = aggregate_received(items.into_iter().zip(results).collect());

    let applied = received.clone();
    apply_if_current(app_core, &h.ticket, "list_received", move |core| {
        core.claims_mut().set_received(applied)
    })
    .await;
    Ok(received)
}

/// Claims the signed-in user filed.
#[instrument(skip(app_core))]
pub async fn list_made(app_core: &Arc<RwLock<AppCore>>) -> Result<Vec<Claim>, FinderError> {
    let h = handles(app_core).await;
    let user = require_authenticated(&h.snapshot, "Viewing your claims")?.user_id;
    let made = recover_auth(app_core, h.api.claims_by_user(user).await).await?;
    let applied = made.clone();
    apply_if_current(app_core, &h.ticket, "list_made", move |core| {
        core.claims_mut().set_made(applied)
    })
    .await;
    Ok(made)
}

/// Every claim, for the admin dashboard.
#[instrument(skip(app_core))]
pub async fn list_all(app_core: &Arc<RwLock<AppCore>>) -> Result<Vec<Claim>, FinderError> {
    let h = handles(app_core).await;
    require_admin(&h.snapshot, "Viewing all claims")?;
    let all = recover_auth(app_core, h.api.list_claims().await).await?;
    let applied = all.clone();
    apply_if_current(app_core, &h.ticket, "list_all_claims", move |core| {
        core.claims_mut().set_all(applied)
    })
    .await;
    Ok(all)
}

/// Approve or reject a pending claim.
///
/// Allowed for the reporter of the claimed item and for administrators. The
/// affected list is refreshed afterwards; a failed refresh is logged.
#[instrument(skip(app_core))]
pub async fn decide(
    app_core: &Arc<RwLock<AppCore>>,
    claim_id: ClaimId,
    decision: Decision,
) -> Result<Claim, FinderError> {
    let h = handles(app_core).await;
    let user = require_authenticated(&h.snapshot, "Deciding a claim")?.clone();

    let (claim, reporter_owned) = {
        let core = app_core.read().await;
        let received = core
            .claims()
            .received()
            .iter()
            .find(|r| r.claim.claim_id == claim_id);
        let claim = received
            .map(|r| r.claim.clone())
            .or_else(|| core.claims().claim(claim_id).cloned())
            .ok_or_else(|| FinderError::not_found(format!("Claim {claim_id} is not loaded")))?;
        let reporter_owned = received.is_some_and(|r| r.item.is_reported_by(user.user_id))
            || core
                .items()
                .item(claim.item_id)
                .is_some_and(|i| i.is_reported_by(user.user_id));
        (claim, reporter_owned)
    };

    let admin = is_admin(Some(&user));
    if !reporter_owned && !admin {
        return Err(FinderError::permission(
            "Only the item's reporter can decide this claim",
        ));
    }
    if !claim.is_decidable() {
        return Err(FinderError::validation(
            "status",
            format!("Claim is already {}", claim.status.as_str().to_lowercase()),
        ));
    }

    let _guard = h.inflight.begin(format!("decide-claim:{claim_id}"))?;
    let outcome = match decision {
        Decision::Approve => h.api.approve_claim(claim_id).await,
        Decision::Reject => h.api.reject_claim(claim_id).await,
    };
    let updated = recover_auth(app_core, outcome).await?;
    if !updated.flags_agree() {
        warn!(%claim_id, status = %updated.status, verified = updated.verified, "claim status and verified flag disagree");
    }
    info!(%claim_id, status = %updated.status, "claim decided");

    let applied = updated.clone();
    with_core(app_core, move |core| {
        core.claims_mut().replace(&applied);
    })
    .await;

    let refreshed = if reporter_owned {
        list_received(app_core).await.map(drop)
    } else {
        list_all(app_core).await.map(drop)
    };
    if let Err(e) = refreshed {
        warn!(error = %e, "could not refresh claims after decision");
    }
    Ok(updated)
}

/// Mark a claim verified. Administrators only; offered while unverified.
#[instrument(skip(app_core))]
pub async fn verify_claim(
    app_core: &Arc<RwLock<AppCore>>,
    claim_id: ClaimId,
) -> Result<Claim, FinderError> {
    let h = handles(app_core).await;
    require_admin(&h.snapshot, "Verifying a claim")?;

    let already = app_core
        .read()
        .await
        .claims()
        .claim(claim_id)
        .map(|c| c.verified)
        .ok_or_else(|| FinderError::not_found(format!("Claim {claim_id} is not loaded")))?;
    if already {
        return Err(FinderError::validation("verified", "Claim is already verified"));
    }

    let _guard = h.inflight.begin(format!("verify-claim:{claim_id}"))?;
    let updated = recover_auth(app_core, h.api.verify_claim(claim_id, true).await).await?;
    let applied = updated.clone();
    with_core(app_core, move |core| {
        core.claims_mut().replace(&applied);
    })
    .await;
    info!(%claim_id, "claim verified");
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use finder_core::{ClaimStatus, ItemStatus, UserId};

    fn backpack() -> Item {
        Item {
            item_id: ItemId(3),
            title: "Blue Backpack".into(),
            description: "Navy".into(),
            location: "Main Campus".into(),
            status: ItemStatus::Found,
            date_report: None,
            image_url: None,
            reporter_id: Some(UserId(1)),
            category_id: None,
            department_id: None,
            category_name: Some("Bags".into()),
            department_name: None,
        }
    }

    fn claim(id: i64, item: i64) -> Claim {
        Claim {
            claim_id: ClaimId(id),
            item_id: ItemId(item),
            claimant_id: UserId(2),
            verification_answer: "mine".into(),
            contact_info: None,
            claim_date: None,
            status: ClaimStatus::Pending,
            verified: false,
        }
    }

    #[test]
    fn test_prepare_claim_rules() {
        let item = backpack();
        let owner = User::new(UserId(1), "a@cit.edu", "USER");
        let other = User::new(UserId(2), "b@cit.edu", "USER");

        assert_matches!(
            prepare_claim(&item, None, "mine", None),
            Err(FinderError::Validation { field, .. }) if field == "userId"
        );
        assert_matches!(
            prepare_claim(&item, Some(&owner), "mine", None),
            Err(FinderError::Validation { field, .. }) if field == "itemId"
        );
        assert_matches!(
            prepare_claim(&item, Some(&other), "   ", None),
            Err(FinderError::Validation { field, .. }) if field == "verificationAnswer"
        );

        let ok = prepare_claim(&item, Some(&other), "  Has a keychain ", Some(" ")).unwrap();
        assert_eq!(ok.verification_answer, "Has a keychain");
        assert_eq!(ok.status, ClaimStatus::Pending);
        assert!(!ok.verified);
        assert!(ok.contact_info.is_none());
    }

    #[test]
    fn test_aggregation_skips_failed_items() {
        let mut second = backpack();
        second.item_id = ItemId(4);
        let mut third = backpack();
        third.item_id = ItemId(5);
        let received = aggregate_received(vec![
            (backpack(), Ok(vec![claim(10, 3)])),
            (second, Err(FinderError::server(500, "boom"))),
            (third, Ok(vec![claim(11, 5), claim(12, 5)])),
        ]);
        let ids: Vec<_> = received.iter().map(|r| r.claim.claim_id).collect();
        assert_eq!(ids, vec![ClaimId(10), ClaimId(11), ClaimId(12)]);
        assert_eq!(received[1].item.item_id, ItemId(5));
    }

    #[test]
    fn test_decision_from_bool() {
        assert_eq!(Decision::from(true), Decision::Approve);
        assert_eq!(Decision::from(false), Decision::Reject);
    }
}
