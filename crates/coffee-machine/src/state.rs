// SPDX-FileCopyrightText: 2026 Coffee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The machine's mutable state and the read-only views derived from it.

use serde::{Deserialize, Serialize};
use strum::Display;

/// Health of a single sub-component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, Serialize, Deserialize)]
pub enum Indicator {
    #[default]
    Okay,
    Alert,
}

/// The five sub-component indicators sampled on power-on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Indicators {
    pub water_level: Indicator,
    pub bean_feed: Indicator,
    pub waste_bin: Indicator,
    pub water_tray: Indicator,
    pub descale_due: Indicator,
}

impl Indicators {
    /// Every indicator set to `Alert`.
    pub const ALL_ALERT: Self = Self {
        water_level: Indicator::Alert,
        bean_feed: Indicator::Alert,
        waste_bin: Indicator::Alert,
        water_tray: Indicator::Alert,
        descale_due: Indicator::Alert,
    };

    /// Only `descale_due` raised.
    pub fn descale_due() -> Self {
        Self {
            descale_due: Indicator::Alert,
            ..Self::default()
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Indicator> {
        [
            self.water_level,
            self.bean_feed,
            self.waste_bin,
            self.water_tray,
            self.descale_due,
        ]
        .into_iter()
    }

    pub fn any_alert(&self) -> bool {
        self.iter().any(|i| i == Indicator::Alert)
    }
}

/// Coarse status shown to pollers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum OverallStatus {
    Off,
    Idle,
    Active,
    Alert,
}

impl OverallStatus {
    /// Numeric value published on the `coffee_machine_status` gauge.
    pub fn code(self) -> u8 {
        match self {
            OverallStatus::Off => 0,
            OverallStatus::Idle => 1,
            OverallStatus::Active => 2,
            OverallStatus::Alert => 3,
        }
    }
}

/// Options that accompany a brew request. The guard ignores them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BrewOptions {
    pub shot_count: u32,
    pub add_milk: bool,
}

/// The device's single source of truth.
///
/// `is_brewing` and `is_descaling` are never both set, and both are clear
/// while the machine is off. Only the guard-checked paths in
/// [`crate::device`] and the executor's completion handler mutate it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MachineState {
    pub powered_on: bool,
    pub is_brewing: bool,
    pub is_descaling: bool,
    pub indicators: Indicators,
}

impl MachineState {
    /// Powered off, idle, all indicators okay.
    pub fn off() -> Self {
        Self::default()
    }

    /// Powered on and idle with the given indicators.
    pub fn idle(indicators: Indicators) -> Self {
        Self {
            powered_on: true,
            indicators,
            ..Self::default()
        }
    }

    pub fn is_alerting(&self) -> bool {
        self.indicators.any_alert()
    }

    /// A brew or descale unit is in flight.
    pub fn is_running(&self) -> bool {
        self.is_brewing || self.is_descaling
    }

    /// Precedence: Off, then Active, then Alert, then Idle.
    pub fn overall_status(&self) -> OverallStatus {
        if !self.powered_on {
            OverallStatus::Off
        } else if self.is_running() {
            OverallStatus::Active
        } else if self.is_alerting() {
            OverallStatus::Alert
        } else {
            OverallStatus::Idle
        }
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            current_state: self.overall_status(),
            is_alerting: self.is_alerting(),
            is_on: self.powered_on,
            is_making_coffee: self.is_brewing,
            is_descaling: self.is_descaling,
            water_level_state: self.indicators.water_level,
            bean_feed_state: self.indicators.bean_feed,
            waste_coffee_state: self.indicators.waste_bin,
            water_tray_state: self.indicators.water_tray,
            descale_state: self.indicators.descale_due,
        }
    }
}

/// A consistent, owned copy of the state as reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub current_state: OverallStatus,
    pub is_alerting: bool,
    pub is_on: bool,
    pub is_making_coffee: bool,
    pub is_descaling: bool,
    pub water_level_state: Indicator,
    pub bean_feed_state: Indicator,
    pub waste_coffee_state: Indicator,
    pub water_tray_state: Indicator,
    pub descale_state: Indicator,
}
