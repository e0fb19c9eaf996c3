//! Effect interfaces
//!
//! Traits describing the side effects the application core needs from its
//! host. Runtime crates provide the real handlers; in-memory handlers live
//! next to each trait for tests and offline use.

pub mod storage;

pub use storage::{MemoryStorage, StorageEffects, StorageError};
