// SPDX-FileCopyrightText: 2026 Coffee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Simulated coffee machine.
//!
//! - [`state`]: the mutable device state and its derived views
//! - [`guard`]: pure admission rules for each action
//! - [`sampler`]: power-on indicator sampling
//! - [`executor`]: supervised brew/descale work units
//! - [`device`]: the [`CoffeeMachine`] handle tying them together

pub mod device;
pub mod executor;
pub mod guard;
pub mod sampler;
pub mod state;

pub use device::{CoffeeMachine, Outcome, Timings};
pub use executor::{Completion, SimulatedWorkload, WorkTicket, Workload};
pub use guard::{Decision, RejectReason, Rejection, Transition, evaluate};
pub use sampler::{FixedSampler, IndicatorSampler, RandomSampler};
pub use state::{
    BrewOptions, Indicator, Indicators, MachineState, OverallStatus, StatusSnapshot,
};
