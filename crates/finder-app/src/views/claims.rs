//! Claim view state: claims received on the user's items, claims the user
//! filed, and the administrator's full listing.

use finder_core::{Claim, ClaimId, ClaimStatus, Item};

/// A claim on one of the user's items, with the item for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedClaim {
    /// The claim
    pub claim: Claim,
    /// Item the claim targets
    pub item: Item,
}

/// Verification filter of the admin dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AdminClaimFilter {
    /// No constraint
    #[default]
    All,
    /// Not yet verified
    Pending,
    /// Verified
    Verified,
}

impl AdminClaimFilter {
    /// Whether `claim` passes the filter.
    pub fn matches(self, claim: &Claim) -> bool {
        match self {
            Self::All => true,
            Self::Pending => !claim.verified,
            Self::Verified => claim.verified,
        }
    }
}

/// Claim lists held by the client.
#[derive(Debug, Clone, Default)]
pub struct ClaimsState {
    received: Vec<ReceivedClaim>,
    made: Vec<Claim>,
    all: Vec<Claim>,
}

impl ClaimsState {
    /// Claims received on the user's items.
    pub fn received(&self) -> &[ReceivedClaim] {
        &self.received
    }

    /// Claims the user filed.
    pub fn made(&self) -> &[Claim] {
        &self.made
    }

    /// Every claim (administrators).
    pub fn all(&self) -> &[Claim] {
        &self.all
    }

    /// Replace received claims.
    pub fn set_received(&mut self, received: Vec<ReceivedClaim>) {
        self.received = received;
    }

    /// Replace filed claims.
    pub fn set_made(&mut self, made: Vec<Claim>) {
        self.made = made;
    }

    /// Replace the full listing.
    pub fn set_all(&mut self, all: Vec<Claim>) {
        self.all = all;
    }

    /// Record a claim the user just filed.
    pub fn push_made(&mut self, claim: Claim) {
        self.made.retain(|c| c.claim_id != claim.claim_id);
        self.made.push(claim);
    }

    /// Look a claim up in any list.
    pub fn claim(&self, id: ClaimId) -> Option<&Claim> {
        self.received
            .iter()
            .map(|r| &r.claim)
            .chain(self.made.iter())
            .chain(self.all.iter())
            .find(|c| c.claim_id == id)
    }

    /// Replace a claim wherever it appears.
    pub fn replace(&mut self, claim: &Claim) -> bool {
        let mut found = false;
        let slots = self
            .received
            .iter_mut()
            .map(|r| &mut r.claim)
            .chain(self.made.iter_mut())
            .chain(self.all.iter_mut());
        for slot in slots {
            if slot.claim_id == claim.claim_id {
                *slot = claim.clone();
                found = true;
            }
        }
        found
    }

    /// Received claims still awaiting a decision.
    pub fn pending_received_count(&self) -> usize {
        self.received
            .iter()
            .filter(|r| r.claim.status == ClaimStatus::Pending)
            .count()
    }

    /// Admin listing under `filter`, in server order.
    pub fn filtered(&self, filter: AdminClaimFilter) -> Vec<&Claim> {
        self.all.iter().filter(|c| filter.matches(c)).collect()
    }

    /// Clear everything tied to a signed-in user.
    pub fn clear(&mut self) {
        self.received.clear();
        self.made.clear();
        self.all.clear();
    }
}
