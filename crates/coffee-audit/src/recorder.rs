// SPDX-FileCopyrightText: 2026 Coffee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Best-effort audit recording.
//!
//! The recorder is called after the guard decision is known. A persistence
//! failure is logged and counted but never surfaces to the caller, so the
//! transport outcome of an action does not depend on the audit store.

use std::sync::Arc;

use coffee_core::{ActionResult, ActionType, AuditEvent, AuditStore, NewAuditEvent};
use tracing::{debug, error};

/// Appends one event per requested action.
#[derive(Clone)]
pub struct AuditRecorder {
    store: Arc<dyn AuditStore>,
}

impl AuditRecorder {
    pub fn new(store: Arc<dyn AuditStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn AuditStore> {
        &self.store
    }

    /// Append an event stamped now. Returns `None` if the write failed.
    pub async fn record(
        &self,
        source_address: &str,
        action: ActionType,
        result: ActionResult,
    ) -> Option<AuditEvent> {
        let event = NewAuditEvent::now(source_address, action, result);
        match self.store.append(&event).await {
            Ok(stored) => {
                debug!(id = stored.id, %action, %result, source = %stored.source_address, "audit event recorded");
                Some(stored)
            }
            Err(e) => {
                coffee_prometheus::record_audit_failure();
                error!(%action, %result, source = %event.source_address, error = %e, "failed to record audit event");
                None
            }
        }
    }
}

impl std::fmt::Debug for AuditRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditRecorder")
            .field("store", &self.store.name())
            .finish()
    }
}
