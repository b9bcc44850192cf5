// SPDX-FileCopyrightText: 2026 Coffee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Supervised execution of long-running work units (brew, descale).
//!
//! Each unit runs in its own task. A supervisor task awaits the unit's
//! `JoinHandle` and, whatever the outcome, clears the activity flag it owns
//! under the state write lock. Faults (panics, aborts) therefore never leave
//! the machine stuck in `Active`. Completion is broadcast on a `watch`
//! channel carried by the [`WorkTicket`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use coffee_core::{ActionType, CoffeeError};
use tokio::sync::{RwLock, watch};
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info};

use crate::state::{BrewOptions, Indicator, MachineState};

/// The physical part of a brew or descale.
#[async_trait]
pub trait Workload: Send + Sync + 'static {
    async fn run(&self, action: ActionType, duration: Duration, options: BrewOptions);
}

/// Waits out the configured duration.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedWorkload;

#[async_trait]
impl Workload for SimulatedWorkload {
    async fn run(&self, action: ActionType, duration: Duration, options: BrewOptions) {
        debug!(
            %action,
            shots = options.shot_count,
            add_milk = options.add_milk,
            duration_ms = duration.as_millis() as u64,
            "work unit started"
        );
        tokio::time::sleep(duration).await;
    }
}

/// Lifecycle of a work unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Running,
    Finished,
    Faulted,
}

/// Handle returned when a brew or descale is accepted.
#[derive(Debug, Clone)]
pub struct WorkTicket {
    pub action: ActionType,
    pub eta: Duration,
    completion: watch::Receiver<Completion>,
}

impl WorkTicket {
    /// Expected duration rounded up to whole seconds.
    pub fn eta_secs(&self) -> u64 {
        self.eta.as_millis().div_ceil(1000) as u64
    }

    pub fn completion(&self) -> Completion {
        *self.completion.borrow()
    }

    /// Wait until the unit leaves `Running`.
    pub async fn wait(&mut self) -> Completion {
        match self
            .completion
            .wait_for(|c| *c != Completion::Running)
            .await
        {
            Ok(c) => *c,
            // Sender dropped without a final value: the supervisor itself died.
            Err(_) => Completion::Faulted,
        }
    }
}

/// Spawns and supervises work units, tracking them for shutdown draining.
pub(crate) struct Executor {
    workload: Arc<dyn Workload>,
    tracker: TaskTracker,
}

impl Executor {
    pub(crate) fn new(workload: Arc<dyn Workload>) -> Self {
        Self {
            workload,
            tracker: TaskTracker::new(),
        }
    }

    /// Start a unit whose activity flag the caller has already set.
    pub(crate) fn launch(
        &self,
        state: Arc<RwLock<MachineState>>,
        action: ActionType,
        duration: Duration,
        options: BrewOptions,
    ) -> WorkTicket {
        let (tx, rx) = watch::channel(Completion::Running);
        let workload = Arc::clone(&self.workload);

        self.tracker.spawn(async move {
            let started = Instant::now();
            let unit = tokio::spawn(async move { workload.run(action, duration, options).await });
            let outcome = unit.await;

            let status = {
                let mut s = state.write().await;
                match action {
                    ActionType::Brew => s.is_brewing = false,
                    ActionType::Descale => {
                        s.is_descaling = false;
                        if outcome.is_ok() {
                            s.indicators.descale_due = Indicator::Okay;
                        }
                    }
                    _ => {}
                }
                s.overall_status()
            };
            coffee_prometheus::set_machine_status(status.code());

            let completion = match outcome {
                Ok(()) => {
                    let elapsed = started.elapsed().as_secs_f64();
                    coffee_prometheus::record_work_unit(&action.to_string(), elapsed);
                    info!(%action, elapsed_secs = elapsed, "work unit finished");
                    Completion::Finished
                }
                Err(e) => {
                    coffee_prometheus::record_executor_fault(&action.to_string());
                    error!(%action, error = %e, "work unit faulted, activity flag cleared");
                    Completion::Faulted
                }
            };
            tx.send_replace(completion);
        });

        WorkTicket {
            action,
            eta: duration,
            completion: rx,
        }
    }

    pub(crate) fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Wait for every tracked unit, up to `timeout`.
    pub(crate) async fn drain(&self, timeout: Duration) -> Result<(), CoffeeError> {
        self.tracker.close();
        let pending = self.tracker.len();
        if pending == 0 {
            info!("no work units to drain");
            return Ok(());
        }

        info!(count = pending, "waiting for work units to complete");
        tokio::time::timeout(timeout, self.tracker.wait())
            .await
            .map_err(|_| CoffeeError::Timeout { duration: timeout })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Indicators;

    struct PanickingWorkload;

    #[async_trait]
    impl Workload for PanickingWorkload {
        async fn run(&self, _: ActionType, _: Duration, _: BrewOptions) {
            panic!("heater element failure");
        }
    }

    fn shared(state: MachineState) -> Arc<RwLock<MachineState>> {
        Arc::new(RwLock::new(state))
    }

    #[test]
    fn eta_rounds_up() {
        let (_tx, rx) = watch::channel(Completion::Running);
        let mut ticket = WorkTicket {
            action: ActionType::Brew,
            eta: Duration::from_secs(11),
            completion: rx,
        };
        assert_eq!(ticket.eta_secs(), 11);
        ticket.eta = Duration::from_millis(10_001);
        assert_eq!(ticket.eta_secs(), 11);
        ticket.eta = Duration::from_millis(1);
        assert_eq!(ticket.eta_secs(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn finished_descale_resets_indicator() {
        let mut initial = MachineState::idle(Indicators::descale_due());
        initial.is_descaling = true;
        let state = shared(initial);
        let executor = Executor::new(Arc::new(SimulatedWorkload));

        let mut ticket = executor.launch(
            Arc::clone(&state),
            ActionType::Descale,
            Duration::from_secs(31),
            BrewOptions::default(),
        );
        assert_eq!(ticket.completion(), Completion::Running);
        assert_eq!(ticket.wait().await, Completion::Finished);

        let s = state.read().await;
        assert!(!s.is_descaling);
        assert_eq!(s.indicators.descale_due, Indicator::Okay);
    }

    #[tokio::test]
    async fn panicking_unit_clears_flag_but_keeps_descale_due() {
        let mut initial = MachineState::idle(Indicators::descale_due());
        initial.is_descaling = true;
        let state = shared(initial);
        let executor = Executor::new(Arc::new(PanickingWorkload));

        let mut ticket = executor.launch(
            Arc::clone(&state),
            ActionType::Descale,
            Duration::from_secs(31),
            BrewOptions::default(),
        );
        assert_eq!(ticket.wait().await, Completion::Faulted);

        let s = state.read().await;
        assert!(!s.is_descaling);
        assert_eq!(s.indicators.descale_due, Indicator::Alert);
    }

    #[tokio::test(start_paused = true)]
    async fn drain_waits_for_units() {
        let mut initial = MachineState::idle(Indicators::default());
        initial.is_brewing = true;
        let state = shared(initial);
        let executor = Executor::new(Arc::new(SimulatedWorkload));
        executor.launch(
            Arc::clone(&state),
            ActionType::Brew,
            Duration::from_secs(11),
            BrewOptions::default(),
        );
        assert_eq!(executor.in_flight(), 1);

        executor
            .drain(Duration::from_secs(60))
            .await
            .expect("unit finishes inside the drain window");
        assert!(!state.read().await.is_brewing);
        assert_eq!(executor.in_flight(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn drain_times_out_on_long_units() {
        let state = shared(MachineState::idle(Indicators::default()));
        let executor = Executor::new(Arc::new(SimulatedWorkload));
        executor.launch(
            state,
            ActionType::Brew,
            Duration::from_secs(600),
            BrewOptions::default(),
        );

        let err = executor.drain(Duration::from_secs(1)).await.unwrap_err();
        assert!(matches!(err, CoffeeError::Timeout { .. }));
    }
}
