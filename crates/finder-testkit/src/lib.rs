//! Wildcats Finder Testing Infrastructure
//!
//! A scripted backend, failure-injecting storage, shared fixtures and a
//! harness that wires them into an `AppCore`.
//!
//! ```rust,ignore
//! use finder_testkit::{fixtures, TestHarness};
//!
//! let harness = TestHarness::new();
//! harness.sign_in(&fixtures::alice()).await?;
//! ```

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

pub mod fixtures;
pub mod harness;
pub mod mock_api;
pub mod storage;

pub use harness::{seeded_api, TestHarness};
pub use mock_api::{Endpoint, MockApi};
pub use storage::FlakyStorage;
