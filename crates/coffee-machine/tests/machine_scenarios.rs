// SPDX-FileCopyrightText: 2026 Coffee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end scenarios against the `CoffeeMachine` handle.

use std::sync::Arc;
use std::time::Duration;

use coffee_config::MachineConfig;
use coffee_core::{ActionResult, ActionType};
use coffee_machine::{
    BrewOptions, CoffeeMachine, Completion, FixedSampler, Indicator, Indicators, OverallStatus,
    Outcome, RejectReason, Timings,
};

fn machine(indicators: Indicators) -> CoffeeMachine {
    CoffeeMachine::new(Timings::default(), Arc::new(FixedSampler(indicators)))
}

fn reason(outcome: &Outcome) -> Option<RejectReason> {
    match outcome {
        Outcome::Rejected(r) => Some(r.reason),
        _ => None,
    }
}

async fn power_on(m: &CoffeeMachine) {
    let outcome = m.request(ActionType::PowerOn, BrewOptions::default()).await;
    assert!(matches!(outcome, Outcome::Executed(s) if s.is_on));
}

#[tokio::test]
async fn brew_while_off_is_rejected_offline() {
    let m = machine(Indicators::default());
    let outcome = m.request(ActionType::Brew, BrewOptions::default()).await;
    assert_eq!(reason(&outcome), Some(RejectReason::Offline));
    assert_eq!(outcome.result(), ActionResult::Failed);

    let status = m.status().await;
    assert_eq!(status.current_state, OverallStatus::Off);
    assert!(!status.is_making_coffee);
}

#[tokio::test]
async fn read_status_is_always_executed() {
    let m = machine(Indicators::default());
    let outcome = m.request(ActionType::ReadStatus, BrewOptions::default()).await;
    assert!(matches!(outcome, Outcome::Executed(s) if s.current_state == OverallStatus::Off));
    assert_eq!(outcome.result(), ActionResult::Passed);
}

#[tokio::test(start_paused = true)]
async fn brew_is_accepted_then_completes() {
    let m = machine(Indicators::default());
    power_on(&m).await;

    let outcome = m
        .request(
            ActionType::Brew,
            BrewOptions {
                shot_count: 2,
                add_milk: true,
            },
        )
        .await;
    let Outcome::Accepted(mut ticket) = outcome else {
        panic!("brew should be accepted, got {outcome:?}");
    };
    assert_eq!(ticket.eta_secs(), 11);
    assert_eq!(ticket.action, ActionType::Brew);

    let during = m.status().await;
    assert!(during.is_making_coffee);
    assert_eq!(during.current_state, OverallStatus::Active);

    let second = m.request(ActionType::Brew, BrewOptions::default()).await;
    assert_eq!(reason(&second), Some(RejectReason::AlreadyBrewing));
    let off = m.request(ActionType::PowerOff, BrewOptions::default()).await;
    assert_eq!(reason(&off), Some(RejectReason::Running));

    assert_eq!(ticket.wait().await, Completion::Finished);
    let after = m.status().await;
    assert!(!after.is_making_coffee);
    assert_eq!(after.current_state, OverallStatus::Idle);
}

#[tokio::test(start_paused = true)]
async fn descale_when_due_resets_indicator() {
    let m = machine(Indicators::descale_due());
    power_on(&m).await;
    assert_eq!(m.status().await.current_state, OverallStatus::Alert);

    let brew = m.request(ActionType::Brew, BrewOptions::default()).await;
    assert_eq!(reason(&brew), Some(RejectReason::Alerting));

    let Outcome::Accepted(mut ticket) = m.request(ActionType::Descale, BrewOptions::default()).await
    else {
        panic!("descale should be accepted");
    };
    assert_eq!(ticket.eta_secs(), 31);

    let during = m.request(ActionType::Brew, BrewOptions::default()).await;
    assert_eq!(reason(&during), Some(RejectReason::Running));

    assert_eq!(ticket.wait().await, Completion::Finished);
    let status = m.status().await;
    assert!(!status.is_descaling);
    assert_eq!(status.descale_state, Indicator::Okay);
    assert_eq!(status.current_state, OverallStatus::Idle);
}

#[tokio::test]
async fn descale_not_due_is_rejected() {
    let m = machine(Indicators::default());
    power_on(&m).await;
    let outcome = m.request(ActionType::Descale, BrewOptions::default()).await;
    assert_eq!(reason(&outcome), Some(RejectReason::NotDue));
}

#[tokio::test]
async fn power_off_returns_state_before_transition() {
    let m = machine(Indicators::default());
    let again = m.request(ActionType::PowerOff, BrewOptions::default()).await;
    assert_eq!(reason(&again), Some(RejectReason::Offline));

    power_on(&m).await;
    let outcome = m.request(ActionType::PowerOff, BrewOptions::default()).await;
    assert!(matches!(outcome, Outcome::Executed(s) if s.is_on));
    assert!(!m.status().await.is_on);

    power_on(&m).await;
    let twice = m.request(ActionType::PowerOn, BrewOptions::default()).await;
    assert_eq!(reason(&twice), Some(RejectReason::AlreadyOnline));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_brews_admit_exactly_one() {
    let m = CoffeeMachine::new(
        Timings {
            brew: Duration::from_millis(200),
            descale: Duration::from_millis(200),
        },
        Arc::new(FixedSampler::default()),
    );
    power_on(&m).await;

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let m = m.clone();
            tokio::spawn(async move { m.request(ActionType::Brew, BrewOptions::default()).await })
        })
        .collect();

    let mut accepted = 0;
    for h in handles {
        if matches!(h.await.unwrap(), Outcome::Accepted(_)) {
            accepted += 1;
        }
    }
    assert_eq!(accepted, 1);

    m.drain(Duration::from_secs(5)).await.unwrap();
    assert!(!m.status().await.is_making_coffee);
}

#[tokio::test]
async fn config_can_start_powered_on() {
    let config = MachineConfig {
        alert_probability: 0.0,
        start_powered_on: true,
        rng_seed: Some(1),
        ..MachineConfig::default()
    };
    let m = CoffeeMachine::from_config(&config);
    let status = m.status().await;
    assert!(status.is_on);
    assert_eq!(status.current_state, OverallStatus::Idle);
    assert_eq!(m.timings(), Timings::default());
}
