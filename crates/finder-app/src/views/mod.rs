//! # View State Module
//!
//! View state types held by [`AppCore`](crate::AppCore). They are plain data:
//! workflows fill them from the server, frontends render them.

pub mod claims;
pub mod items;
pub mod notifications;

pub use claims::{AdminClaimFilter, ClaimsState, ReceivedClaim};
pub use items::{
    admin_filter, filter_items, match_suggestions, AdminItemFilter, ItemFilter, ItemQuery,
    ItemsState, MatchReason, MatchSuggestion, ReferenceData,
};
pub use notifications::{Toast, ToastLevel, ToastQueue};
