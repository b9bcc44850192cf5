// SPDX-FileCopyrightText: 2026 Coffee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the coffee machine.
//!
//! Maps each route to one machine action, audits the decision, and renders
//! the outcome. Statistics and metrics are served from the same listener.

pub mod auth;
pub mod handlers;
pub mod server;

use std::net::SocketAddr;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use coffee_core::{AdapterType, CoffeeError, HealthStatus, PluginAdapter};

pub use crate::auth::AuthConfig;
pub use crate::server::{GatewayState, HealthState, ServerConfig, build_router};

/// The running HTTP transport.
pub struct Gateway {
    config: ServerConfig,
    state: GatewayState,
    shutdown: CancellationToken,
    server_handle: Mutex<Option<JoinHandle<Result<(), CoffeeError>>>>,
}

impl Gateway {
    /// `shutdown` stops the server gracefully when cancelled.
    pub fn new(config: ServerConfig, state: GatewayState, shutdown: CancellationToken) -> Self {
        Self {
            config,
            state,
            shutdown,
            server_handle: Mutex::new(None),
        }
    }

    /// Bind and start serving in the background. Returns the bound address.
    pub async fn start(&self) -> Result<SocketAddr, CoffeeError> {
        let mut handle = self.server_handle.lock().await;
        if handle.is_some() {
            return Err(CoffeeError::Transport {
                message: "gateway already started".into(),
                source: None,
            });
        }

        let listener = server::bind(&self.config).await?;
        let addr = listener.local_addr().map_err(|e| CoffeeError::Transport {
            message: format!("failed to read gateway address: {e}"),
            source: Some(Box::new(e)),
        })?;

        let state = self.state.clone();
        let token = self.shutdown.clone();
        *handle = Some(tokio::spawn(server::serve(listener, state, token)));
        Ok(addr)
    }

    /// Wait for the server task to exit, propagating its error.
    pub async fn join(&self) -> Result<(), CoffeeError> {
        let Some(handle) = self.server_handle.lock().await.take() else {
            return Ok(());
        };
        handle
            .await
            .map_err(|e| CoffeeError::Internal(format!("gateway task failed: {e}")))?
    }
}

#[async_trait]
impl PluginAdapter for Gateway {
    fn name(&self) -> &str {
        "gateway"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Transport
    }

    async fn health_check(&self) -> Result<HealthStatus, CoffeeError> {
        let handle = self.server_handle.lock().await;
        match handle.as_ref() {
            Some(h) if !h.is_finished() => Ok(HealthStatus::Healthy),
            Some(_) => Ok(HealthStatus::Unhealthy("server stopped".to_string())),
            None => Ok(HealthStatus::Unhealthy("server not started".to_string())),
        }
    }

    async fn shutdown(&self) -> Result<(), CoffeeError> {
        self.shutdown.cancel();
        self.join().await
    }
}
