// SPDX-FileCopyrightText: 2026 Coffee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for coffee integration tests.
//!
//! - [`TestHarness`] - full stack behind the router, temp SQLite audit log
//! - [`FailingAuditStore`] - audit store whose every call errors

pub mod harness;
pub mod mock_store;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_store::FailingAuditStore;
