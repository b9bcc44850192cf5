// SPDX-FileCopyrightText: 2026 Coffee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests through the full stack.
//!
//! Each test creates an isolated TestHarness with a temp SQLite audit log.
//! Tests are independent and order-insensitive.

use std::sync::Arc;
use std::time::Duration;

use axum::http::{Method, StatusCode};
use chrono::Utc;
use coffee_audit::seed::synthetic_brew_events;
use coffee_core::{ActionResult, ActionType};
use coffee_machine::{Indicator, Indicators, Timings};
use coffee_test_utils::{FailingAuditStore, TestHarness};
use serde_json::json;

fn quick_timings() -> Timings {
    Timings {
        brew: Duration::from_millis(50),
        descale: Duration::from_millis(80),
    }
}

async fn wait_until_idle(harness: &TestHarness) {
    for _ in 0..100 {
        if harness.machine.in_flight() == 0 {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("work unit did not finish");
}

// ---- Brewing lifecycle ----

#[tokio::test]
async fn brew_runs_to_completion_and_is_audited() {
    let harness = TestHarness::builder()
        .with_timings(quick_timings())
        .build()
        .await
        .unwrap();

    let (status, _) = harness.request(Method::POST, "/api/coffee/make", None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = harness
        .request(Method::POST, "/api/coffee/status/online", None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = harness
        .request(
            Method::POST,
            "/api/coffee/make",
            Some(json!({"number_espresso_shots": 3, "add_milk": false})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["seconds_until_completion"], 1);

    let (status, body) = harness.request(Method::POST, "/api/coffee/make", None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "The coffee machine is already making coffee, please wait.");

    wait_until_idle(&harness).await;
    let (_, body) = harness.request(Method::GET, "/api/coffee/status", None).await;
    assert_eq!(body["is_making_coffee"], false);
    assert_eq!(body["current_state"], "Idle");

    let events = harness.store.list_events(None).await.unwrap();
    let trail: Vec<_> = events.iter().map(|e| (e.action_type, e.result)).collect();
    assert_eq!(
        trail,
        vec![
            (ActionType::Brew, ActionResult::Failed),
            (ActionType::PowerOn, ActionResult::Passed),
            (ActionType::Brew, ActionResult::Passed),
            (ActionType::Brew, ActionResult::Failed),
            (ActionType::ReadStatus, ActionResult::Passed),
        ]
    );
    assert!(events.iter().all(|e| e.source_address == "192.0.2.10"));
}

#[tokio::test]
async fn descale_clears_the_due_indicator() {
    let harness = TestHarness::builder()
        .with_timings(quick_timings())
        .with_indicators(Indicators {
            descale_due: Indicator::Alert,
            ..Indicators::default()
        })
        .powered_on()
        .build()
        .await
        .unwrap();

    let (_, body) = harness.request(Method::GET, "/api/coffee/status", None).await;
    assert_eq!(body["current_state"], "Alert");
    assert_eq!(body["descale_state"], "Alert");

    let (status, body) = harness.request(Method::POST, "/api/coffee/descale", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], 200);

    let (_, body) = harness.request(Method::GET, "/api/coffee/status", None).await;
    assert_eq!(body["is_descaling"], true);

    wait_until_idle(&harness).await;
    let (_, body) = harness.request(Method::GET, "/api/coffee/status", None).await;
    assert_eq!(body["is_descaling"], false);
    assert_eq!(body["descale_state"], "Okay");
    assert_eq!(body["current_state"], "Idle");

    let (status, _) = harness.request(Method::POST, "/api/coffee/descale", None).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn alerting_machine_refuses_to_brew() {
    let harness = TestHarness::builder()
        .with_indicators(Indicators {
            water_level: Indicator::Alert,
            ..Indicators::default()
        })
        .powered_on()
        .build()
        .await
        .unwrap();

    let (status, body) = harness.request(Method::POST, "/api/coffee/make", None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        body["message"],
        "The coffee machine is currently in an alert state and the action 'make coffee' cannot be performed."
    );

    // Power cycling re-runs the self-check, which still reports the alert.
    harness.request(Method::DELETE, "/api/coffee/status/online", None).await;
    let (_, body) = harness
        .request(Method::POST, "/api/coffee/status/online", None)
        .await;
    assert_eq!(body["water_level_state"], "Alert");
    assert_eq!(body["is_alerting"], true);
}

// ---- Audit failures ----

#[tokio::test]
async fn audit_failures_do_not_change_responses() {
    let store = Arc::new(FailingAuditStore::new());
    let harness = TestHarness::builder()
        .with_store(store.clone())
        .build()
        .await
        .unwrap();

    let (status, body) = harness
        .request(Method::POST, "/api/coffee/status/online", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_on"], true);

    let (status, _) = harness.request(Method::POST, "/api/coffee/make", None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(store.append_attempts(), 2);

    let (status, body) = harness.request(Method::GET, "/api/statistics", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["status"], 500);
}

// ---- Statistics ----

#[tokio::test]
async fn seeded_history_is_served_as_statistics() {
    let harness = TestHarness::builder().build().await.unwrap();
    let sqlite = harness.sqlite.clone().unwrap();
    sqlite
        .append_batch(synthetic_brew_events(140, 60, Utc::now()))
        .await
        .unwrap();

    let (status, body) = harness.request(Method::GET, "/api/statistics", None).await;
    assert_eq!(status, StatusCode::OK);

    let days = body.as_array().unwrap();
    assert_eq!(days.len(), 7);
    let names = [
        "Sunday",
        "Monday",
        "Tuesday",
        "Wednesday",
        "Thursday",
        "Friday",
        "Saturday",
    ];
    let positions: Vec<usize> = days
        .iter()
        .map(|d| {
            names
                .iter()
                .position(|n| d["day"] == *n)
                .expect("weekday name")
        })
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));

    for day in days {
        let day_avg = day["average"].as_f64().unwrap();
        let hour_sum: f64 = day["hours"]
            .as_array()
            .unwrap()
            .iter()
            .map(|h| h["average"].as_f64().unwrap())
            .sum();
        assert!((day_avg - hour_sum).abs() < 1e-9);
    }
}

// ---- Infrastructure ----

#[tokio::test]
async fn infrastructure_and_metrics() {
    let harness = TestHarness::builder()
        .with_metrics(Arc::new(|| "# TYPE coffee_machine_status gauge\n".to_string()))
        .build()
        .await
        .unwrap();

    let (status, body) = harness.request(Method::GET, "/api/infrastructure", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["online"], true);

    let (status, body) = harness.request(Method::GET, "/metrics", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_str().unwrap().contains("coffee_machine_status"));
}

#[tokio::test]
async fn bearer_token_is_enforced_end_to_end() {
    let harness = TestHarness::builder()
        .with_bearer_token("latte")
        .build()
        .await
        .unwrap();

    let (status, _) = harness.request(Method::GET, "/api/coffee/status", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = harness
        .request_with_token(Method::GET, "/api/coffee/status", None, Some("latte"))
        .await;
    assert_eq!(status, StatusCode::OK);
}
