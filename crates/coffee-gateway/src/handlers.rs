// SPDX-FileCopyrightText: 2026 Coffee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the machine, statistics and infrastructure routes.
//!
//! Every machine handler follows the same shape: ask the machine, audit the
//! decision with the caller's address, then map the outcome to a response.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{ConnectInfo, FromRequestParts, State};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use coffee_core::ActionType;
use coffee_machine::{BrewOptions, Outcome, RejectReason, Rejection, StatusSnapshot};
use serde::{Deserialize, Serialize};

use crate::server::GatewayState;

/// Peer IP of the request, or `"unknown"` when the router was served
/// without connect info.
#[derive(Debug, Clone)]
pub struct SourceAddress(pub String);

impl<S: Send + Sync> FromRequestParts<S> for SourceAddress {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let address = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string())
            .unwrap_or_else(|| "unknown".to_string());
        Ok(Self(address))
    }
}

/// Body of machine status responses.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub machine: Option<StatusSnapshot>,
}

/// Body of brew and descale responses.
#[derive(Debug, Serialize)]
pub struct WorkResponse {
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seconds_until_completion: Option<u64>,
}

/// Body of `POST /api/coffee/make`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MakeCoffeeRequest {
    pub number_espresso_shots: i64,
    pub add_milk: bool,
}

impl MakeCoffeeRequest {
    /// `None` for a negative or out-of-range shot count. Shots are otherwise
    /// unbounded.
    fn brew_options(&self) -> Option<BrewOptions> {
        Some(BrewOptions {
            shot_count: u32::try_from(self.number_espresso_shots).ok()?,
            add_milk: self.add_milk,
        })
    }
}

/// Error body for non-machine failures.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub status: u16,
    pub message: String,
}

fn error_response(code: StatusCode, message: impl Into<String>) -> Response {
    let body = ErrorResponse {
        status: code.as_u16(),
        message: message.into(),
    };
    (code, Json(body)).into_response()
}

/// HTTP status for a guard rejection.
pub fn rejection_status(rejection: &Rejection) -> StatusCode {
    match rejection.reason {
        RejectReason::AlreadyOnline => StatusCode::BAD_REQUEST,
        _ => StatusCode::CONFLICT,
    }
}

fn rejected(rejection: &Rejection) -> (StatusCode, String) {
    (rejection_status(rejection), rejection.message())
}

/// Run `action` against the machine and write the audit event.
async fn perform(
    state: &GatewayState,
    source: &str,
    action: ActionType,
    options: BrewOptions,
) -> Outcome {
    let outcome = state.machine.request(action, options).await;
    state.recorder.record(source, action, outcome.result()).await;
    outcome
}

fn status_reply(outcome: Outcome) -> Response {
    match outcome {
        Outcome::Executed(snapshot) => {
            let body = StatusResponse {
                status: StatusCode::OK.as_u16(),
                message: None,
                machine: Some(snapshot),
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Outcome::Rejected(rejection) => {
            let (code, message) = rejected(&rejection);
            let body = StatusResponse {
                status: code.as_u16(),
                message: Some(message),
                machine: None,
            };
            (code, Json(body)).into_response()
        }
        Outcome::Accepted(ticket) => {
            tracing::error!(action = %ticket.action, "status route produced a work unit");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "unexpected work unit")
        }
    }
}

fn work_reply(outcome: Outcome, success: StatusCode, verb: &str) -> Response {
    match outcome {
        Outcome::Accepted(ticket) => {
            let seconds = ticket.eta_secs();
            let body = WorkResponse {
                status: success.as_u16(),
                message: Some(format!(
                    "The coffee machine has started {verb}, completion expected in {seconds} seconds"
                )),
                seconds_until_completion: Some(seconds),
            };
            (success, Json(body)).into_response()
        }
        Outcome::Rejected(rejection) => {
            let (code, message) = rejected(&rejection);
            let body = WorkResponse {
                status: code.as_u16(),
                message: Some(message),
                seconds_until_completion: None,
            };
            (code, Json(body)).into_response()
        }
        Outcome::Executed(_) => {
            tracing::error!(verb, "work route completed without a work unit");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "unexpected outcome")
        }
    }
}

/// GET /api/coffee/status
pub async fn get_status(
    State(state): State<GatewayState>,
    SourceAddress(source): SourceAddress,
) -> Response {
    status_reply(perform(&state, &source, ActionType::ReadStatus, BrewOptions::default()).await)
}

/// POST /api/coffee/status/online
pub async fn power_on(
    State(state): State<GatewayState>,
    SourceAddress(source): SourceAddress,
) -> Response {
    status_reply(perform(&state, &source, ActionType::PowerOn, BrewOptions::default()).await)
}

/// DELETE /api/coffee/status/online
pub async fn power_off(
    State(state): State<GatewayState>,
    SourceAddress(source): SourceAddress,
) -> Response {
    status_reply(perform(&state, &source, ActionType::PowerOff, BrewOptions::default()).await)
}

/// POST /api/coffee/make
///
/// An empty body brews with default options.
pub async fn make_coffee(
    State(state): State<GatewayState>,
    SourceAddress(source): SourceAddress,
    body: Bytes,
) -> Response {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        MakeCoffeeRequest::default()
    } else {
        match serde_json::from_slice::<MakeCoffeeRequest>(&body) {
            Ok(request) => request,
            Err(e) => {
                return error_response(StatusCode::BAD_REQUEST, format!("invalid request body: {e}"));
            }
        }
    };

    let Some(options) = request.brew_options() else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "number_espresso_shots must be a non-negative integer",
        );
    };

    let outcome = perform(&state, &source, ActionType::Brew, options).await;
    work_reply(outcome, StatusCode::CREATED, "making coffee")
}

/// POST /api/coffee/descale
pub async fn descale(
    State(state): State<GatewayState>,
    SourceAddress(source): SourceAddress,
) -> Response {
    let outcome = perform(&state, &source, ActionType::Descale, BrewOptions::default()).await;
    work_reply(outcome, StatusCode::OK, "descaling")
}

/// GET /api/statistics
pub async fn get_statistics(State(state): State<GatewayState>) -> Response {
    match coffee_audit::load_statistics(state.store.as_ref()).await {
        Ok(days) => (StatusCode::OK, Json(days)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "failed to load statistics");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "statistics unavailable")
        }
    }
}

#[derive(Debug, Serialize)]
pub struct InfrastructureResponse {
    pub status: u16,
    pub online: bool,
    pub uptime_secs: u64,
}

/// GET /api/infrastructure
pub async fn get_infrastructure(State(state): State<GatewayState>) -> Json<InfrastructureResponse> {
    Json(InfrastructureResponse {
        status: StatusCode::OK.as_u16(),
        online: true,
        uptime_secs: state.health.start_time.elapsed().as_secs(),
    })
}

/// GET /metrics
pub async fn get_metrics(State(state): State<GatewayState>) -> Response {
    match &state.health.prometheus_render {
        Some(render) => (
            StatusCode::OK,
            [(
                axum::http::header::CONTENT_TYPE,
                "text/plain; version=0.0.4; charset=utf-8",
            )],
            render(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
