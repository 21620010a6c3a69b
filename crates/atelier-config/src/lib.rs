// SPDX-FileCopyrightText: 2026 Atelier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Atelier support desk.
//!
//! Layered TOML configuration with environment variable overrides, strict
//! unknown-field rejection, and startup validation.

pub mod loader;
pub mod model;

pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{AtelierConfig, GatewayConfig, ServiceConfig, StorageConfig, UpstreamConfig};
