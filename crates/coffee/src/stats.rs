// SPDX-FileCopyrightText: 2026 Coffee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `coffee stats`: print brewing statistics as JSON.

use coffee_audit::load_statistics;
use coffee_config::StorageConfig;
use coffee_core::{AuditStore, CoffeeError};
use coffee_storage::SqliteAuditStore;

pub async fn render_stats(storage: StorageConfig) -> Result<String, CoffeeError> {
    let store = SqliteAuditStore::open(storage).await?;
    let days = load_statistics(&store).await?;
    store.close().await?;
    serde_json::to_string_pretty(&days)
        .map_err(|e| CoffeeError::Internal(format!("failed to serialize statistics: {e}")))
}
