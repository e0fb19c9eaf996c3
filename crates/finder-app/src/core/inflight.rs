//! Duplicate-submission guard.
//!
//! A mutating workflow takes a guard for its operation key before touching
//! the network and holds it until the response is applied. A second attempt
//! with the same key while the first is outstanding is refused.

use finder_core::FinderError;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;

/// Set of operation keys currently awaiting a response.
#[derive(Debug, Clone, Default)]
pub struct InFlight {
    active: Arc<Mutex<HashSet<String>>>,
}

impl InFlight {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `key`, failing with [`FinderError::InProgress`] if it is taken.
    pub fn begin(&self, key: impl Into<String>) -> Result<InFlightGuard, FinderError> {
        let key = key.into();
        let mut active = self.active.lock();
        if !active.insert(key.clone()) {
            return Err(FinderError::in_progress(key));
        }
        Ok(InFlightGuard {
            active: Arc::clone(&self.active),
            key,
        })
    }

    /// Whether `key` is outstanding; frontends disable the matching control.
    pub fn is_active(&self, key: &str) -> bool {
        self.active.lock().contains(key)
    }
}

/// Releases its key on drop.
#[derive(Debug)]
#[must_use = "the operation is only guarded while the guard is alive"]
pub struct InFlightGuard {
    active: Arc<Mutex<HashSet<String>>>,
    key: String,
}

impl InFlightGuard {
    /// Key held by this guard.
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.active.lock().remove(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_second_submission_is_refused_until_release() {
        let inflight = InFlight::new();
        let guard = inflight.begin("report-item").unwrap();
        assert!(inflight.is_active("report-item"));
        assert_matches!(
            inflight.begin("report-item"),
            Err(FinderError::InProgress { operation }) if operation == "report-item"
        );
        assert!(inflight.begin("decide-claim:1").is_ok());

        drop(guard);
        assert!(!inflight.is_active("report-item"));
        assert!(inflight.begin("report-item").is_ok());
    }
}
