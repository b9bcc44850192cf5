// SPDX-FileCopyrightText: 2026 Coffee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric registration and recording helpers.
//!
//! These go through the metrics-rs facade and are no-ops until a recorder
//! is installed.

use metrics::{describe_counter, describe_gauge, describe_histogram};

/// Describe every coffee metric. Called once after the recorder is installed.
pub fn register_metrics() {
    describe_counter!(
        "coffee_actions_total",
        "Actions requested of the machine, by action and result"
    );
    describe_counter!(
        "coffee_audit_failures_total",
        "Audit events that could not be persisted"
    );
    describe_counter!(
        "coffee_executor_faults_total",
        "Work units that ended abnormally"
    );
    describe_gauge!(
        "coffee_machine_status",
        "Overall machine status (0 off, 1 idle, 2 active, 3 alert)"
    );
    describe_histogram!(
        "coffee_work_unit_seconds",
        "Wall-clock duration of brew and descale work units"
    );
}

/// Count a guard decision.
pub fn record_action(action: &str, result: &str) {
    metrics::counter!(
        "coffee_actions_total",
        "action" => action.to_string(),
        "result" => result.to_string()
    )
    .increment(1);
}

pub fn record_audit_failure() {
    metrics::counter!("coffee_audit_failures_total").increment(1);
}

pub fn record_executor_fault(action: &str) {
    metrics::counter!("coffee_executor_faults_total", "action" => action.to_string()).increment(1);
}

/// Publish the numeric overall status.
pub fn set_machine_status(code: u8) {
    metrics::gauge!("coffee_machine_status").set(f64::from(code));
}

pub fn record_work_unit(action: &str, seconds: f64) {
    metrics::histogram!("coffee_work_unit_seconds", "action" => action.to_string())
        .record(seconds);
}
