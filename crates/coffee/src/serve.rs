// SPDX-FileCopyrightText: 2026 Coffee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `coffee serve` command implementation.
//!
//! Opens the audit store, builds the machine and gateway, then serves until
//! SIGINT/SIGTERM. On shutdown the gateway stops accepting requests, running
//! brew and descale units get up to `gateway.drain_timeout_secs` to finish,
//! and the WAL is checkpointed.

use std::sync::Arc;
use std::time::Duration;

use coffee_audit::AuditRecorder;
use coffee_config::CoffeeConfig;
use coffee_core::{AuditStore, CoffeeError, PluginAdapter};
use coffee_gateway::{AuthConfig, Gateway, GatewayState, HealthState, ServerConfig};
use coffee_machine::CoffeeMachine;
use coffee_storage::SqliteAuditStore;
use tracing::{error, info, warn};

use crate::shutdown;

type RenderFn = Arc<dyn Fn() -> String + Send + Sync>;

/// Run the service until a shutdown signal arrives.
pub async fn run_serve(config: CoffeeConfig) -> Result<(), CoffeeError> {
    init_tracing(&config.service.log_level);
    info!(name = %config.service.name, version = env!("CARGO_PKG_VERSION"), "starting");

    let store = Arc::new(SqliteAuditStore::open(config.storage.clone()).await?);
    info!(path = %config.storage.database_path, "audit store ready");

    let prometheus_render = init_metrics(&config)?;

    let machine = CoffeeMachine::from_config(&config.machine);
    let recorder = AuditRecorder::new(store.clone());

    let token = shutdown::install_signal_handler();
    let state = GatewayState {
        machine: machine.clone(),
        recorder,
        store: store.clone(),
        auth: AuthConfig {
            bearer_token: config.gateway.bearer_token.clone(),
        },
        health: HealthState::new(prometheus_render),
    };
    let gateway = Gateway::new(
        ServerConfig {
            host: config.gateway.host.clone(),
            port: config.gateway.port,
        },
        state,
        token.clone(),
    );

    let addr = gateway.start().await?;
    info!(%addr, "coffee machine ready");

    // Returns after graceful shutdown, or early if the server fails.
    let served = gateway.join().await;
    if let Err(e) = &served {
        error!(error = %e, "gateway stopped unexpectedly");
        token.cancel();
    }

    let drain_timeout = Duration::from_secs(config.gateway.drain_timeout_secs);
    let in_flight = machine.in_flight();
    if in_flight > 0 {
        info!(in_flight, timeout = ?drain_timeout, "waiting for running units");
    }
    if let Err(e) = machine.drain(drain_timeout).await {
        // Abandoned units are not persisted; the machine starts off and idle next run.
        warn!(error = %e, in_flight = machine.in_flight(), "drain timed out, abandoning units");
    }

    if let Err(e) = store.close().await {
        warn!(error = %e, "audit store close failed");
    }
    if let Err(e) = store.shutdown().await {
        warn!(error = %e, "audit store shutdown failed");
    }

    info!("shutdown complete");
    served
}

fn init_metrics(config: &CoffeeConfig) -> Result<Option<RenderFn>, CoffeeError> {
    if !config.prometheus.enabled {
        return Ok(None);
    }
    let adapter = Arc::new(coffee_prometheus::PrometheusAdapter::new()?);
    let render: RenderFn = Arc::new(move || adapter.render());
    Ok(Some(render))
}

/// Initializes the tracing subscriber. `RUST_LOG` overrides `log_level`.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("coffee={log_level},tower_http=warn,warn")));

    // try_init: tests may have installed a subscriber already.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .try_init();
}
