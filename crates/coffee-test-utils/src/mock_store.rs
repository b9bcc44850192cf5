// SPDX-FileCopyrightText: 2026 Coffee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Audit store that fails on demand.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use coffee_core::{
    ActionType, AdapterType, AuditEvent, AuditStore, CoffeeError, HealthStatus, NewAuditEvent,
    PluginAdapter,
};

/// An `AuditStore` whose writes and reads always fail.
///
/// Counts append attempts so tests can prove the recorder was still called.
#[derive(Debug, Default)]
pub struct FailingAuditStore {
    append_attempts: AtomicUsize,
    closed: AtomicBool,
}

impl FailingAuditStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_attempts(&self) -> usize {
        self.append_attempts.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn unavailable() -> CoffeeError {
        CoffeeError::storage(std::io::Error::other("audit store unavailable"))
    }
}

#[async_trait]
impl PluginAdapter for FailingAuditStore {
    fn name(&self) -> &str {
        "failing"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 0, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, CoffeeError> {
        Ok(HealthStatus::Unhealthy("audit store unavailable".into()))
    }

    async fn shutdown(&self) -> Result<(), CoffeeError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl AuditStore for FailingAuditStore {
    async fn initialize(&self) -> Result<(), CoffeeError> {
        Ok(())
    }

    async fn close(&self) -> Result<(), CoffeeError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn append(&self, _event: &NewAuditEvent) -> Result<AuditEvent, CoffeeError> {
        self.append_attempts.fetch_add(1, Ordering::SeqCst);
        Err(Self::unavailable())
    }

    async fn list_events(&self, _action: Option<ActionType>) -> Result<Vec<AuditEvent>, CoffeeError> {
        Err(Self::unavailable())
    }
}
