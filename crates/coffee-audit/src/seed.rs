// SPDX-FileCopyrightText: 2026 Coffee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Synthetic brew history for demos and statistics checks.

use chrono::{DateTime, Duration, Utc};
use coffee_core::{ActionResult, ActionType, NewAuditEvent};

/// Source address stamped on seeded events.
pub const SEED_SOURCE: &str = ":8080";

/// Default number of seeded events.
pub const DEFAULT_COUNT: u32 = 140;

/// Default distance of the first event from `now`, in days.
pub const DEFAULT_DAYS_BACK: u32 = 60;

/// Build `count` passed brew events starting `days_back` days before `now`.
///
/// Event `i` (1-based) advances the clock by `5 * i` minutes, and every
/// 20th event skips an extra day first, so brews drift across hours and
/// weekdays.
pub fn synthetic_brew_events(count: u32, days_back: u32, now: DateTime<Utc>) -> Vec<NewAuditEvent> {
    let mut at = now - Duration::days(i64::from(days_back));
    (1..=count)
        .map(|i| {
            if i % 20 == 0 {
                at += Duration::days(1);
            }
            at += Duration::minutes(5 * i64::from(i));
            NewAuditEvent::at(SEED_SOURCE, ActionType::Brew, ActionResult::Passed, at)
        })
        .collect()
}
