//! # Workflows - Portable Business Logic
//!
//! Multi-step operations shared by every frontend.
//!
//! ## Design Patterns
//!
//! **1. Lock discipline**
//! - Copy handles (bridge, session store, in-flight set, view ticket) out of
//!   `AppCore` under a short read lock
//! - Await the network with no lock held
//! - Re-acquire the write lock to apply results
//!
//! **2. Stale results**
//! - Reads that fill a view capture a `ViewTicket` first and are dropped if
//!   the user navigated away meanwhile
//!
//! **3. Error Handling**
//! - Return `Result<T, FinderError>`; validation happens before any request
//! - Frontends turn errors into toasts via `AppCore::notify_error`

pub mod claims;
pub mod items;
pub mod profile;
pub mod session;

pub(crate) mod runtime;
pub(crate) mod state_helpers;

pub use claims::{decide, list_made, list_received, submit_claim, verify_claim, Decision};
pub use items::{
    delete_item, edit_item, load_items, load_reference_data, load_stats, report_item,
    set_item_status, Confirmation, ItemDraft,
};
pub use profile::{load_profile, ProfileSummary};
pub use session::{initialize, login, logout, register};
