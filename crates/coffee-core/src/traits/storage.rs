// SPDX-FileCopyrightText: 2026 Coffee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Audit store trait for persistence backends (SQLite, etc.).

use async_trait::async_trait;

use crate::error::CoffeeError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ActionType, AuditEvent, NewAuditEvent};

/// Append-only store for audit events.
///
/// The core only ever appends and lists; events are never updated or
/// deleted once written. Implementations must not lose writes under
/// concurrent appends.
#[async_trait]
pub trait AuditStore: PluginAdapter {
    /// Initializes the storage backend (migrations, connection, etc.).
    async fn initialize(&self) -> Result<(), CoffeeError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), CoffeeError>;

    /// Appends an event and returns it with its assigned id.
    async fn append(&self, event: &NewAuditEvent) -> Result<AuditEvent, CoffeeError>;

    /// Lists events in insertion order, optionally filtered by action type.
    async fn list_events(
        &self,
        action_type: Option<ActionType>,
    ) -> Result<Vec<AuditEvent>, CoffeeError>;
}
