// SPDX-FileCopyrightText: 2026 Coffee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Audit trail and usage statistics.
//!
//! [`AuditRecorder`] appends one event per requested action without ever
//! failing the caller. [`statistics::aggregate`] turns the brew events in
//! the log into per-weekday and per-hour averages. [`seed`] produces a
//! synthetic brew history.

pub mod recorder;
pub mod seed;
pub mod statistics;

pub use recorder::AuditRecorder;
pub use statistics::{AggregatedDay, AggregatedHour, aggregate, load_statistics};
