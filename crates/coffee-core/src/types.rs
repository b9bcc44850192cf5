// SPDX-FileCopyrightText: 2026 Coffee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the machine, audit, storage, and transport crates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Maximum stored length of a source address (fits a textual IPv6 address).
pub const MAX_SOURCE_LEN: usize = 40;

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Storage,
    Transport,
    Observability,
}

/// Every action a caller can request of the machine.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
pub enum ActionType {
    PowerOn,
    PowerOff,
    Brew,
    Descale,
    ReadStatus,
}

impl ActionType {
    /// Human-readable label used in rejection messages.
    pub fn label(self) -> &'static str {
        match self {
            ActionType::PowerOn => "turn on",
            ActionType::PowerOff => "turn off",
            ActionType::Brew => "make coffee",
            ActionType::Descale => "descale",
            ActionType::ReadStatus => "read status",
        }
    }
}

/// Outcome classification recorded in the audit log.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum ActionResult {
    Passed,
    Failed,
}

impl ActionResult {
    /// `Passed` when the action was permitted.
    pub fn from_permitted(permitted: bool) -> Self {
        if permitted {
            ActionResult::Passed
        } else {
            ActionResult::Failed
        }
    }
}

/// An audit event that has not been written yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAuditEvent {
    pub source_address: String,
    pub action_type: ActionType,
    pub result: ActionResult,
    pub created_at: DateTime<Utc>,
}

impl NewAuditEvent {
    /// Build an event stamped with the current time.
    ///
    /// The source address is truncated to [`MAX_SOURCE_LEN`] characters.
    pub fn now(source_address: &str, action_type: ActionType, result: ActionResult) -> Self {
        Self::at(source_address, action_type, result, Utc::now())
    }

    /// Build an event with an explicit timestamp (seeding, imports, tests).
    pub fn at(
        source_address: &str,
        action_type: ActionType,
        result: ActionResult,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            source_address: source_address.chars().take(MAX_SOURCE_LEN).collect(),
            action_type,
            result,
            created_at,
        }
    }
}

/// A persisted, immutable audit event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub id: i64,
    #[serde(rename = "source")]
    pub source_address: String,
    #[serde(rename = "type")]
    pub action_type: ActionType,
    pub result: ActionResult,
    #[serde(rename = "created_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "modified_datetime")]
    pub modified_at: DateTime<Utc>,
}
