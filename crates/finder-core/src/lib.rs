//! Finder Core - domain model shared by every Wildcats Finder crate
//!
//! This crate holds the data the lost-and-found client exchanges with the
//! backend, the single error taxonomy every component translates failures
//! into, and the durable-storage effect interface. It performs no I/O.
//!
//! # Contents
//! - [`identity`]: the authenticated user record cached by the client
//! - [`item`]: reported lost/found items and their status lifecycle
//! - [`claim`]: ownership claims filed against items
//! - [`reference`]: categories and departments used by report forms
//! - [`errors`]: [`FinderError`], the unified error type
//! - [`effects`]: the [`StorageEffects`] trait and an in-memory handler

#![forbid(unsafe_code)]

/// Ownership claims and their decision lifecycle
pub mod claim;

/// Pure effect interfaces plus in-memory handlers
pub mod effects;

/// Unified error handling
pub mod errors;

/// Numeric identifiers used by the backend
pub mod identifiers;

/// Authenticated identity record
pub mod identity;

/// Reported items, statuses and statistics
pub mod item;

/// Category and department reference lists
pub mod reference;

pub use claim::{Claim, ClaimStatus, NewClaim};
pub use effects::storage::{MemoryStorage, StorageEffects, StorageError};
pub use errors::{AuthFailure, FinderError, Result};
pub use identifiers::{CategoryId, ClaimId, DepartmentId, ItemId, UserId};
pub use identity::User;
pub use item::{Item, ItemStats, ItemStatus};
pub use reference::{Category, Department};
