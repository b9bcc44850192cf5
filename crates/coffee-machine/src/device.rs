// SPDX-FileCopyrightText: 2026 Coffee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The injectable device handle.
//!
//! [`CoffeeMachine`] owns the single [`MachineState`] behind a
//! `tokio::sync::RwLock`. Every mutating request evaluates the guard and
//! applies the transition under one write guard, so two concurrent requests
//! can never both pass the same check. Status reads take the read guard and
//! return an owned snapshot.

use std::sync::Arc;
use std::time::Duration;

use coffee_config::MachineConfig;
use coffee_core::{ActionResult, ActionType, CoffeeError};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::executor::{Executor, SimulatedWorkload, WorkTicket, Workload};
use crate::guard::{self, Decision, Rejection, Transition};
use crate::sampler::{IndicatorSampler, RandomSampler};
use crate::state::{BrewOptions, MachineState, StatusSnapshot};

/// Durations of the long-running actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    pub brew: Duration,
    pub descale: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            brew: Duration::from_secs(11),
            descale: Duration::from_secs(31),
        }
    }
}

impl From<&MachineConfig> for Timings {
    fn from(config: &MachineConfig) -> Self {
        Self {
            brew: Duration::from_secs(config.brew_duration_secs),
            descale: Duration::from_secs(config.descale_duration_secs),
        }
    }
}

/// Result of a request against the machine.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// Power toggles and status reads. `PowerOff` carries the snapshot from
    /// before the transition, `PowerOn` the one after.
    Executed(StatusSnapshot),
    /// A brew or descale unit was started.
    Accepted(WorkTicket),
    Rejected(Rejection),
}

impl Outcome {
    /// `Passed` iff the guard permitted the action.
    pub fn result(&self) -> ActionResult {
        ActionResult::from_permitted(!matches!(self, Outcome::Rejected(_)))
    }
}

struct Inner {
    state: Arc<RwLock<MachineState>>,
    sampler: Arc<dyn IndicatorSampler>,
    executor: Executor,
    timings: Timings,
}

/// Cloneable handle to one simulated machine.
#[derive(Clone)]
pub struct CoffeeMachine {
    inner: Arc<Inner>,
}

impl CoffeeMachine {
    /// A powered-off machine using the simulated workload.
    pub fn new(timings: Timings, sampler: Arc<dyn IndicatorSampler>) -> Self {
        Self::with_workload(timings, sampler, Arc::new(SimulatedWorkload))
    }

    pub fn with_workload(
        timings: Timings,
        sampler: Arc<dyn IndicatorSampler>,
        workload: Arc<dyn Workload>,
    ) -> Self {
        Self::with_state(MachineState::off(), timings, sampler, workload)
    }

    fn with_state(
        state: MachineState,
        timings: Timings,
        sampler: Arc<dyn IndicatorSampler>,
        workload: Arc<dyn Workload>,
    ) -> Self {
        coffee_prometheus::set_machine_status(state.overall_status().code());
        Self {
            inner: Arc::new(Inner {
                state: Arc::new(RwLock::new(state)),
                sampler,
                executor: Executor::new(workload),
                timings,
            }),
        }
    }

    /// Build a machine from configuration.
    ///
    /// With `start_powered_on` the power-on self-check runs immediately.
    pub fn from_config(config: &MachineConfig) -> Self {
        let sampler: Arc<dyn IndicatorSampler> = match config.rng_seed {
            Some(seed) => Arc::new(RandomSampler::seeded(config.alert_probability, seed)),
            None => Arc::new(RandomSampler::new(config.alert_probability)),
        };
        let state = if config.start_powered_on {
            MachineState::idle(sampler.sample())
        } else {
            MachineState::off()
        };
        Self::with_state(
            state,
            Timings::from(config),
            sampler,
            Arc::new(SimulatedWorkload),
        )
    }

    pub fn timings(&self) -> Timings {
        self.inner.timings
    }

    /// Consistent snapshot of the current state.
    pub async fn status(&self) -> StatusSnapshot {
        self.inner.state.read().await.snapshot()
    }

    /// Evaluate `action` and, if permitted, apply it.
    ///
    /// `options` only matter for `Brew`.
    pub async fn request(&self, action: ActionType, options: BrewOptions) -> Outcome {
        let outcome = if action == ActionType::ReadStatus {
            Outcome::Executed(self.status().await)
        } else {
            self.transition(action, options).await
        };
        coffee_prometheus::record_action(&action.to_string(), &outcome.result().to_string());
        outcome
    }

    async fn transition(&self, action: ActionType, options: BrewOptions) -> Outcome {
        let mut state = self.inner.state.write().await;

        let transition = match guard::evaluate(&state, action) {
            Decision::Permit(t) => t,
            Decision::Reject(rejection) => {
                info!(%action, reason = %rejection.reason, "action rejected");
                return Outcome::Rejected(rejection);
            }
        };

        let outcome = match transition {
            Transition::PowerOn => {
                state.indicators = self.inner.sampler.sample();
                state.powered_on = true;
                debug!(indicators = ?state.indicators, "power-on self-check");
                Outcome::Executed(state.snapshot())
            }
            Transition::PowerOff => {
                let before = state.snapshot();
                state.powered_on = false;
                Outcome::Executed(before)
            }
            Transition::StartBrew => {
                state.is_brewing = true;
                Outcome::Accepted(self.inner.executor.launch(
                    Arc::clone(&self.inner.state),
                    action,
                    self.inner.timings.brew,
                    options,
                ))
            }
            Transition::StartDescale => {
                state.is_descaling = true;
                Outcome::Accepted(self.inner.executor.launch(
                    Arc::clone(&self.inner.state),
                    action,
                    self.inner.timings.descale,
                    options,
                ))
            }
            Transition::Observe => Outcome::Executed(state.snapshot()),
        };

        coffee_prometheus::set_machine_status(state.overall_status().code());
        info!(%action, status = %state.overall_status(), "action permitted");
        outcome
    }

    /// Number of brew/descale units still running.
    pub fn in_flight(&self) -> usize {
        self.inner.executor.in_flight()
    }

    /// Wait for in-flight units to finish, up to `timeout`.
    pub async fn drain(&self, timeout: Duration) -> Result<(), CoffeeError> {
        self.inner.executor.drain(timeout).await
    }
}

impl std::fmt::Debug for CoffeeMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoffeeMachine")
            .field("timings", &self.inner.timings)
            .field("in_flight", &self.in_flight())
            .finish_non_exhaustive()
    }
}
