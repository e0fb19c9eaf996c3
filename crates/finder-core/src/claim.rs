//! # Claims
//!
//! An ownership claim filed by one user against another user's item.
//!
//! `status` drives the lifecycle (`PENDING → APPROVED | REJECTED`). The
//! server stores `verified` separately and can set it through its own
//! endpoint, so the client reads both fields as sent and never derives one
//! from the other.

use crate::identifiers::{ClaimId, ItemId, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Claim decision status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClaimStatus {
    /// Awaiting a decision by the item's reporter or an administrator
    Pending,
    /// Accepted; older backends report this as `CLAIMED`
    #[serde(alias = "CLAIMED")]
    Approved,
    /// Refused
    Rejected,
    /// Any status this client does not know yet
    #[serde(other)]
    Unknown,
}

impl ClaimStatus {
    /// A decision has been recorded.
    pub fn is_resolved(self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }

    /// Wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Claim record as returned by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claim {
    /// Backend identifier
    pub claim_id: ClaimId,
    /// Claimed item
    pub item_id: ItemId,
    /// Claiming user
    #[serde(rename = "userId")]
    pub claimant_id: UserId,
    /// Ownership evidence supplied by the claimant
    #[serde(default)]
    pub verification_answer: String,
    /// How to reach the claimant
    #[serde(default)]
    pub contact_info: Option<String>,
    /// Server timestamp, ISO-8601 without zone
    #[serde(default)]
    pub claim_date: Option<String>,
    /// Decision status
    pub status: ClaimStatus,
    /// Verification flag, stored independently of `status`
    #[serde(default)]
    pub verified: bool,
}

impl Claim {
    /// Only pending claims accept approve/reject.
    pub fn is_decidable(&self) -> bool {
        self.status == ClaimStatus::Pending
    }

    /// Whether `status` and `verified` tell the same story.
    ///
    /// Approved claims are expected to be verified and everything else not.
    /// The server does not guarantee this; callers use it for diagnostics only.
    pub fn flags_agree(&self) -> bool {
        self.verified == (self.status == ClaimStatus::Approved)
    }
}

/// Body of `POST /api/claims`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewClaim {
    /// Claimed item
    pub item_id: ItemId,
    /// Claiming user
    pub user_id: UserId,
    /// Ownership evidence
    pub verification_answer: String,
    /// Claimant contact details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_info: Option<String>,
    /// Always PENDING on creation
    pub status: ClaimStatus,
    /// Always false on creation
    pub verified: bool,
}

impl NewClaim {
    /// Build a fresh pending, unverified claim.
    pub fn pending(
        item_id: ItemId,
        user_id: UserId,
        verification_answer: impl Into<String>,
        contact_info: Option<String>,
    ) -> Self {
        Self {
            item_id,
            user_id,
            verification_answer: verification_answer.into(),
            contact_info,
            status: ClaimStatus::Pending,
            verified: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_claimed_status_reads_as_approved() {
        let status: ClaimStatus = serde_json::from_str("\"CLAIMED\"").unwrap();
        assert_eq!(status, ClaimStatus::Approved);
        assert!(status.is_resolved());
    }

    #[test]
    fn test_new_claim_wire_shape() {
        let body = NewClaim::pending(ItemId(3), UserId(2), "Has a keychain", None);
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["itemId"], 3);
        assert_eq!(json["userId"], 2);
        assert_eq!(json["status"], "PENDING");
        assert_eq!(json["verified"], false);
        assert!(json.get("contactInfo").is_none());
    }

    #[test]
    fn test_flags_read_independently() {
        let json = r#"{"claimId":1,"itemId":3,"userId":2,"verificationAnswer":"x",
            "status":"PENDING","verified":true}"#;
        let claim: Claim = serde_json::from_str(json).unwrap();
        assert!(claim.verified);
        assert!(claim.is_decidable());
        assert!(!claim.flags_agree());
    }
}
