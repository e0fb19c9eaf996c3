//! # Finder App - Portable Headless Application Core
//!
//! Everything the lost-and-found client does except drawing pixels and
//! speaking HTTP:
//!
//! - **Session Store** ([`session`]): identity and credential lifecycle
//! - **Authorization Gate** ([`authorization`]): allow/redirect decisions
//! - **View Router** ([`router`]): screens, navigation epochs, sidebar choice
//! - **Item and Claim lifecycles** ([`workflows`]): validated operations
//!   against the backend
//! - **View state** ([`views`]): listings, filters, toasts
//!
//! The backend is reached through the [`ApiBridge`] trait; `finder-agent`
//! provides the HTTP implementation.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use finder_app::{workflows, AppConfig, AppCore, Screen};
//!
//! let app_core = AppCore::new(AppConfig::default(), api, storage).into_shared();
//! workflows::initialize(&app_core).await?;
//! app_core.write().await.navigate(Screen::Home);
//! ```

#![forbid(unsafe_code)]

pub mod authorization;
pub mod core;
pub mod errors;
pub mod router;
pub mod runtime_bridge;
pub mod session;
pub mod views;
pub mod workflows;

pub use crate::core::{AppConfig, AppCore, InFlight, InFlightGuard};
pub use authorization::{AccessRequirement, GateDecision};
pub use errors::{user_message, ErrorCategory};
pub use router::{Navigation, ReportPanel, Screen, SidebarKind, ViewRouter, ViewTicket};
pub use runtime_bridge::{
    ApiBridge, Credentials, ImageUpload, ItemUpdate, LoginGrant, Registration, ReportForm,
};
pub use session::{IdentitySource, SessionPhase, SessionSnapshot, SessionStore};
pub use views::{ToastLevel, ToastQueue};

pub use finder_core as domain;
