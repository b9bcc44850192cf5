// SPDX-FileCopyrightText: 2026 Coffee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles the full service stack (machine with fixed
//! indicators, SQLite audit log in a temp directory, recorder and router)
//! and drives it through HTTP requests without binding a socket.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Method, Request, StatusCode, header};
use coffee_audit::AuditRecorder;
use coffee_config::model::StorageConfig;
use coffee_core::{ActionType, AuditStore, CoffeeError};
use coffee_gateway::{AuthConfig, GatewayState, HealthState, build_router};
use coffee_machine::{BrewOptions, CoffeeMachine, FixedSampler, Indicators, Timings};
use coffee_storage::SqliteAuditStore;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

/// Peer address attached to every harness request.
pub const TEST_PEER: ([u8; 4], u16) = ([192, 0, 2, 10], 50_000);

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    indicators: Indicators,
    powered_on: bool,
    timings: Timings,
    bearer_token: Option<String>,
    store: Option<Arc<dyn AuditStore>>,
    metrics: Option<Arc<dyn Fn() -> String + Send + Sync>>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            indicators: Indicators::default(),
            powered_on: false,
            timings: Timings::default(),
            bearer_token: None,
            store: None,
            metrics: None,
        }
    }

    /// Indicators reported by every power-on self-check.
    pub fn with_indicators(mut self, indicators: Indicators) -> Self {
        self.indicators = indicators;
        self
    }

    /// Power the machine on before handing it out. Not audited.
    pub fn powered_on(mut self) -> Self {
        self.powered_on = true;
        self
    }

    pub fn with_timings(mut self, timings: Timings) -> Self {
        self.timings = timings;
        self
    }

    pub fn with_bearer_token(mut self, token: &str) -> Self {
        self.bearer_token = Some(token.to_string());
        self
    }

    /// Replace the temp SQLite store, e.g. with a failing mock.
    pub fn with_store(mut self, store: Arc<dyn AuditStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Serve `/metrics` using `render`.
    pub fn with_metrics(mut self, render: Arc<dyn Fn() -> String + Send + Sync>) -> Self {
        self.metrics = Some(render);
        self
    }

    /// Build the harness, creating all required subsystems.
    pub async fn build(self) -> Result<TestHarness, CoffeeError> {
        let temp_dir = tempfile::TempDir::new().map_err(CoffeeError::storage)?;

        let (store, sqlite): (Arc<dyn AuditStore>, _) = match self.store {
            Some(store) => (store, None),
            None => {
                let config = StorageConfig {
                    database_path: temp_dir.path().join("audit.db").to_string_lossy().into_owned(),
                    wal_mode: true,
                };
                let sqlite = Arc::new(SqliteAuditStore::open(config).await?);
                (sqlite.clone() as Arc<dyn AuditStore>, Some(sqlite))
            }
        };

        let machine = CoffeeMachine::new(self.timings, Arc::new(FixedSampler(self.indicators)));
        if self.powered_on {
            machine
                .request(ActionType::PowerOn, BrewOptions::default())
                .await;
        }

        let state = GatewayState {
            machine: machine.clone(),
            recorder: AuditRecorder::new(store.clone()),
            store: store.clone(),
            auth: AuthConfig {
                bearer_token: self.bearer_token,
            },
            health: HealthState::new(self.metrics),
        };

        Ok(TestHarness {
            machine,
            store,
            sqlite,
            router: build_router(state),
            _temp_dir: temp_dir,
        })
    }
}

/// A complete test environment with a temp audit database.
pub struct TestHarness {
    pub machine: CoffeeMachine,
    pub store: Arc<dyn AuditStore>,
    /// The concrete store when the default SQLite backend is in use.
    pub sqlite: Option<Arc<SqliteAuditStore>>,
    pub router: Router,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Send one request through the router.
    ///
    /// JSON bodies are parsed; anything else comes back as a string value.
    pub async fn request(&self, method: Method, path: &str, body: Option<Value>) -> (StatusCode, Value) {
        self.request_with_token(method, path, body, None).await
    }

    pub async fn request_with_token(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let mut request = builder.body(body).expect("valid request");
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(TEST_PEER)));

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body collects")
            .to_bytes();

        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, value)
    }
}
