// SPDX-FileCopyrightText: 2026 Coffee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prometheus metrics adapter for the coffee machine service.
//!
//! Uses the metrics-rs facade with the Prometheus exporter. The gateway
//! serves [`PrometheusAdapter::render`] on `/metrics`.

pub mod recording;

use async_trait::async_trait;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use coffee_core::CoffeeError;
use coffee_core::traits::adapter::PluginAdapter;
use coffee_core::types::{AdapterType, HealthStatus};

pub use recording::{
    record_action, record_audit_failure, record_executor_fault, record_work_unit,
    set_machine_status,
};

/// Owns the installed Prometheus recorder.
pub struct PrometheusAdapter {
    handle: PrometheusHandle,
}

impl PrometheusAdapter {
    /// Install the Prometheus recorder globally.
    ///
    /// Only one recorder can exist per process; a second call returns an error.
    pub fn new() -> Result<Self, CoffeeError> {
        let handle = PrometheusBuilder::new().install_recorder().map_err(|e| {
            CoffeeError::Internal(format!("failed to install Prometheus recorder: {e}"))
        })?;

        recording::register_metrics();
        tracing::info!("prometheus metrics recorder installed");

        Ok(Self { handle })
    }

    pub fn handle(&self) -> &PrometheusHandle {
        &self.handle
    }

    /// Render all collected metrics in Prometheus text format.
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

#[async_trait]
impl PluginAdapter for PrometheusAdapter {
    fn name(&self) -> &str {
        "prometheus"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Observability
    }

    async fn health_check(&self) -> Result<HealthStatus, CoffeeError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), CoffeeError> {
        Ok(())
    }
}
