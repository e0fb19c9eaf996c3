//! Runtime access helpers for workflows.

use std::sync::Arc;

use async_lock::RwLock;

use crate::core::InFlight;
use crate::router::ViewTicket;
use crate::runtime_bridge::ApiBridge;
use crate::session::{SessionSnapshot, SessionStore};
use crate::AppCore;

/// Everything a workflow needs while the core lock is released.
pub(crate) struct Handles {
    pub api: Arc<dyn ApiBridge>,
    pub session: SessionStore,
    pub snapshot: SessionSnapshot,
    pub inflight: InFlight,
    pub ticket: ViewTicket,
}

/// Copy the workflow handles out of the core under a short read lock.
pub(crate) async fn handles(app_core: &Arc<RwLock<AppCore>>) -> Handles {
    let core = app_core.read().await;
    Handles {
        api: core.api(),
        session: core.session().clone(),
        snapshot: core.snapshot(),
        inflight: core.inflight().clone(),
        ticket: core.router().ticket(),
    }
}
