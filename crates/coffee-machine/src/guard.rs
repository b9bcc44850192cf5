// SPDX-FileCopyrightText: 2026 Coffee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Admission rules for machine actions.
//!
//! [`evaluate`] is pure: it inspects a [`MachineState`] and returns a
//! [`Decision`] without mutating anything. Rules are checked in order and
//! the first failing rule determines the rejection reason.

use coffee_core::ActionType;
use strum::Display;

use crate::state::{Indicator, MachineState};

/// Why an action was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum RejectReason {
    /// The machine is powered off.
    Offline,
    /// Power-on requested while already on.
    AlreadyOnline,
    /// A brew or descale unit is in flight.
    Running,
    /// Brew requested while an indicator is raised.
    Alerting,
    /// Descale requested while descaling is not due.
    NotDue,
    /// Brew requested while a brew is in flight.
    AlreadyBrewing,
}

/// A refused action together with its reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rejection {
    pub reason: RejectReason,
    pub action: ActionType,
}

impl Rejection {
    pub fn new(reason: RejectReason, action: ActionType) -> Self {
        Self { reason, action }
    }

    /// Human-readable explanation returned to the caller.
    pub fn message(&self) -> String {
        let label = self.action.label();
        match self.reason {
            RejectReason::Offline => format!(
                "The coffee machine is currently offline and the action '{label}' cannot be performed."
            ),
            RejectReason::AlreadyOnline => format!(
                "The coffee machine is currently online and the action '{label}' cannot be performed."
            ),
            RejectReason::Running => format!(
                "The coffee machine is currently descaling or making coffee so the action '{label}' cannot be performed."
            ),
            RejectReason::Alerting => format!(
                "The coffee machine is currently in an alert state and the action '{label}' cannot be performed."
            ),
            RejectReason::NotDue => format!(
                "The coffee machine is not due for descaling, the action '{label}' cannot be performed."
            ),
            RejectReason::AlreadyBrewing => {
                "The coffee machine is already making coffee, please wait.".to_string()
            }
        }
    }
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message())
    }
}

/// The state change a permitted action will apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    PowerOn,
    PowerOff,
    StartBrew,
    StartDescale,
    Observe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Permit(Transition),
    Reject(Rejection),
}

impl Decision {
    pub fn is_permit(&self) -> bool {
        matches!(self, Decision::Permit(_))
    }
}

/// Decide whether `action` may run against `state`.
pub fn evaluate(state: &MachineState, action: ActionType) -> Decision {
    let reject = |reason| Decision::Reject(Rejection::new(reason, action));

    match action {
        ActionType::PowerOff => {
            if !state.powered_on {
                reject(RejectReason::Offline)
            } else if state.is_running() {
                reject(RejectReason::Running)
            } else {
                Decision::Permit(Transition::PowerOff)
            }
        }
        ActionType::PowerOn => {
            if state.powered_on {
                reject(RejectReason::AlreadyOnline)
            } else {
                Decision::Permit(Transition::PowerOn)
            }
        }
        ActionType::Brew => {
            if !state.powered_on {
                reject(RejectReason::Offline)
            } else if state.is_brewing {
                reject(RejectReason::AlreadyBrewing)
            } else if state.is_descaling {
                reject(RejectReason::Running)
            } else if state.is_alerting() {
                reject(RejectReason::Alerting)
            } else {
                Decision::Permit(Transition::StartBrew)
            }
        }
        ActionType::Descale => {
            if !state.powered_on {
                reject(RejectReason::Offline)
            } else if state.is_running() {
                reject(RejectReason::Running)
            } else if state.indicators.descale_due == Indicator::Okay {
                reject(RejectReason::NotDue)
            } else {
                Decision::Permit(Transition::StartDescale)
            }
        }
        ActionType::ReadStatus => Decision::Permit(Transition::Observe),
    }
}
