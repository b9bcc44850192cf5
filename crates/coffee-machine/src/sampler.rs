// SPDX-FileCopyrightText: 2026 Coffee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Indicator sampling performed on every power-on.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::state::{Indicator, Indicators};

/// Source of indicator readings for the power-on self-check.
pub trait IndicatorSampler: Send + Sync + 'static {
    fn sample(&self) -> Indicators;
}

/// Raises each indicator independently with a fixed probability.
pub struct RandomSampler {
    probability: f64,
    rng: Mutex<StdRng>,
}

impl RandomSampler {
    /// Entropy-seeded sampler. `probability` is clamped to `[0, 1]`.
    pub fn new(probability: f64) -> Self {
        Self::with_rng(probability, StdRng::from_entropy())
    }

    /// Deterministic sampler for reproducible runs.
    pub fn seeded(probability: f64, seed: u64) -> Self {
        Self::with_rng(probability, StdRng::seed_from_u64(seed))
    }

    fn with_rng(probability: f64, rng: StdRng) -> Self {
        let probability = if probability.is_nan() {
            0.0
        } else {
            probability.clamp(0.0, 1.0)
        };
        Self {
            probability,
            rng: Mutex::new(rng),
        }
    }
}

impl IndicatorSampler for RandomSampler {
    fn sample(&self) -> Indicators {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut draw = || {
            if rng.gen_bool(self.probability) {
                Indicator::Alert
            } else {
                Indicator::Okay
            }
        };
        Indicators {
            water_level: draw(),
            bean_feed: draw(),
            waste_bin: draw(),
            water_tray: draw(),
            descale_due: draw(),
        }
    }
}

/// Always returns the same readings.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedSampler(pub Indicators);

impl IndicatorSampler for FixedSampler {
    fn sample(&self) -> Indicators {
        self.0
    }
}
