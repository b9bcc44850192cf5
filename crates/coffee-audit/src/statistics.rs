// SPDX-FileCopyrightText: 2026 Coffee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-weekday and per-weekday-hour brewing averages.
//!
//! Averages are brews per elapsed week, where the number of weeks is the
//! span between the first and last brew rounded up, and never less than one.
//! All bucketing is done in UTC.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Timelike, Utc, Weekday};
use coffee_core::{ActionType, AuditEvent, AuditStore, CoffeeError};
use serde::{Serialize, Serializer};

/// Brewing activity for one hour of one weekday.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedHour {
    pub hour: u32,
    #[serde(skip)]
    pub weekday: Weekday,
    pub average: f64,
}

/// Brewing activity for one weekday.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedDay {
    #[serde(rename = "day", serialize_with = "weekday_name")]
    pub weekday: Weekday,
    /// Earliest brew on this weekday.
    pub min: DateTime<Utc>,
    /// Latest brew on this weekday.
    pub max: DateTime<Utc>,
    pub average: f64,
    pub hours: Vec<AggregatedHour>,
}

fn weekday_name<S: Serializer>(day: &Weekday, s: S) -> Result<S::Ok, S::Error> {
    let name = match day {
        Weekday::Sun => "Sunday",
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
    };
    s.serialize_str(name)
}

/// Whole weeks spanned by `[min, max]`, rounded up, at least one.
pub fn weeks_elapsed(min: DateTime<Utc>, max: DateTime<Utc>) -> u32 {
    const WEEK_MS: i64 = 7 * 24 * 60 * 60 * 1000;
    let span = (max - min).num_milliseconds().max(0);
    let weeks = (span + WEEK_MS - 1) / WEEK_MS;
    u32::try_from(weeks).unwrap_or(u32::MAX).max(1)
}

#[derive(Default)]
struct DayBucket {
    count: u32,
    min: Option<DateTime<Utc>>,
    max: Option<DateTime<Utc>>,
    hours: BTreeMap<u32, u32>,
}

/// Aggregate brew events. Non-brew events are ignored; no brews gives an
/// empty result.
///
/// Days are ordered Sunday first, hours ascending.
pub fn aggregate(events: &[AuditEvent]) -> Vec<AggregatedDay> {
    let brews: Vec<DateTime<Utc>> = events
        .iter()
        .filter(|e| e.action_type == ActionType::Brew)
        .map(|e| e.created_at)
        .collect();

    let (Some(first), Some(last)) = (brews.iter().min(), brews.iter().max()) else {
        return Vec::new();
    };
    let weeks = f64::from(weeks_elapsed(*first, *last));

    let mut days: BTreeMap<u32, DayBucket> = BTreeMap::new();
    for at in &brews {
        let bucket = days.entry(at.weekday().num_days_from_sunday()).or_default();
        bucket.count += 1;
        bucket.min = Some(bucket.min.map_or(*at, |m| m.min(*at)));
        bucket.max = Some(bucket.max.map_or(*at, |m| m.max(*at)));
        *bucket.hours.entry(at.hour()).or_default() += 1;
    }

    days.into_values()
        .filter_map(|bucket| {
            let (min, max) = (bucket.min?, bucket.max?);
            let weekday = min.weekday();
            Some(AggregatedDay {
                weekday,
                min,
                max,
                average: f64::from(bucket.count) / weeks,
                hours: bucket
                    .hours
                    .into_iter()
                    .map(|(hour, count)| AggregatedHour {
                        hour,
                        weekday,
                        average: f64::from(count) / weeks,
                    })
                    .collect(),
            })
        })
        .collect()
}

/// Read brew events from the store and aggregate them.
pub async fn load_statistics(store: &dyn AuditStore) -> Result<Vec<AggregatedDay>, CoffeeError> {
    let events = store.list_events(Some(ActionType::Brew)).await?;
    Ok(aggregate(&events))
}
