// SPDX-FileCopyrightText: 2026 Coffee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the `AuditStore` trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use coffee_config::model::StorageConfig;
use coffee_core::{
    ActionType, AdapterType, AuditEvent, AuditStore, CoffeeError, HealthStatus, NewAuditEvent,
    PluginAdapter,
};

use crate::database::Database;
use crate::queries;

/// SQLite-backed audit store.
///
/// The database is opened by [`AuditStore::initialize`]; every other call
/// fails until then.
pub struct SqliteAuditStore {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteAuditStore {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Open and initialize in one step.
    pub async fn open(config: StorageConfig) -> Result<Self, CoffeeError> {
        let store = Self::new(config);
        store.initialize().await?;
        Ok(store)
    }

    fn db(&self) -> Result<&Database, CoffeeError> {
        self.db.get().ok_or_else(|| CoffeeError::Storage {
            source: "audit store not initialized, call initialize() first".into(),
        })
    }

    /// Bulk append inside one transaction (used by seeding).
    pub async fn append_batch(&self, events: Vec<NewAuditEvent>) -> Result<usize, CoffeeError> {
        queries::audit::append_events(self.db()?, events).await
    }
}

#[async_trait]
impl PluginAdapter for SqliteAuditStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, CoffeeError> {
        self.db()?
            .connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), CoffeeError> {
        if let Some(db) = self.db.get() {
            db.checkpoint().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl AuditStore for SqliteAuditStore {
    async fn initialize(&self) -> Result<(), CoffeeError> {
        let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| CoffeeError::Storage {
            source: "audit store already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite audit store initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), CoffeeError> {
        self.db()?.checkpoint().await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }

    async fn append(&self, event: &NewAuditEvent) -> Result<AuditEvent, CoffeeError> {
        queries::audit::append_event(self.db()?, event).await
    }

    async fn list_events(&self, action: Option<ActionType>) -> Result<Vec<AuditEvent>, CoffeeError> {
        queries::audit::list_events(self.db()?, action).await
    }
}
