// SPDX-FileCopyrightText: 2026 Coffee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `coffee seed`: append a synthetic brew history to the audit log.

use chrono::Utc;
use coffee_audit::seed::synthetic_brew_events;
use coffee_config::StorageConfig;
use coffee_core::{AuditStore, CoffeeError};
use coffee_storage::SqliteAuditStore;

/// Append `count` brew events spread over the last `days` days.
///
/// Returns the number of rows written.
pub async fn run_seed(storage: StorageConfig, count: u32, days: u32) -> Result<usize, CoffeeError> {
    let store = SqliteAuditStore::open(storage).await?;
    let events = synthetic_brew_events(count, days, Utc::now());
    let written = store.append_batch(events).await?;
    tracing::info!(written, days, "seeded brew history");
    store.close().await?;
    Ok(written)
}
