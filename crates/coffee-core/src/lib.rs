// SPDX-FileCopyrightText: 2026 Coffee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the coffee machine service.
//!
//! This crate provides the foundational trait definitions, error types, and
//! common types used throughout the workspace. Storage backends implement
//! the traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::CoffeeError;
pub use types::{
    ActionResult, ActionType, AdapterType, AuditEvent, HealthStatus, NewAuditEvent,
};

pub use traits::{AuditStore, PluginAdapter};
