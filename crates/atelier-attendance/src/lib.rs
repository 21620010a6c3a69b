// SPDX-FileCopyrightText: 2026 Atelier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Attendance hand-off workflow for the Atelier support desk.
//!
//! A conversation starts pending, is claimed by exactly one employee, may be
//! transferred, and is closed by its assignee. [`machine`] holds the pure
//! transitions; [`service`] persists them with compare-and-swap writes and
//! publishes change-feed events.

pub mod machine;
pub mod service;

pub use service::{AttendanceService, AttendanceStats};
