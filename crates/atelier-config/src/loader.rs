// SPDX-FileCopyrightText: 2026 Atelier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports the XDG hierarchy: `./atelier.toml` > `~/.config/atelier/atelier.toml`
//! > `/etc/atelier/atelier.toml`, with environment variable overrides via the
//! `ATELIER_` prefix.

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use atelier_core::AtelierError;

use crate::model::AtelierConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/atelier/atelier.toml` (system-wide)
/// 3. `~/.config/atelier/atelier.toml` (user XDG config)
/// 4. `./atelier.toml` (local directory)
/// 5. `ATELIER_*` environment variables
pub fn load_config() -> Result<AtelierConfig, AtelierError> {
    extract(build_figment())
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit inline configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<AtelierConfig, AtelierError> {
    extract(
        Figment::new()
            .merge(Serialized::defaults(AtelierConfig::default()))
            .merge(Toml::string(toml_content)),
    )
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<AtelierConfig, AtelierError> {
    extract(
        Figment::new()
            .merge(Serialized::defaults(AtelierConfig::default()))
            .merge(Toml::file(path))
            .merge(env_provider()),
    )
}

fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(AtelierConfig::default()))
        .merge(Toml::file("/etc/atelier/atelier.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("atelier/atelier.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("atelier.toml"))
        .merge(env_provider())
}

fn extract(figment: Figment) -> Result<AtelierConfig, AtelierError> {
    let config: AtelierConfig = figment
        .extract()
        .map_err(|e| AtelierError::Config(e.to_string()))?;
    validate(&config)?;
    Ok(config)
}

/// Create the environment variable provider.
///
/// Uses `Env::map()` rather than `Env::split("_")` so underscore-containing
/// key names stay unambiguous: `ATELIER_UPSTREAM_API_KEY` must map to
/// `upstream.api_key`, not `upstream.api.key`.
fn env_provider() -> Env {
    Env::prefixed("ATELIER_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("service_", "service.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("upstream_", "upstream.", 1)
            .replacen("gateway_", "gateway.", 1);
        mapped.into()
    })
}

/// Reject configurations that would fail at runtime in confusing ways.
fn validate(config: &AtelierConfig) -> Result<(), AtelierError> {
    if config.storage.database_path.is_empty() {
        return Err(AtelierError::Config(
            "storage.database_path must not be empty".to_string(),
        ));
    }
    if !(0.0..=2.0).contains(&config.upstream.temperature) {
        return Err(AtelierError::Config(format!(
            "upstream.temperature must be within 0.0..=2.0, got {}",
            config.upstream.temperature
        )));
    }
    if config.upstream.timeout_secs == 0 {
        return Err(AtelierError::Config(
            "upstream.timeout_secs must be greater than zero".to_string(),
        ));
    }
    if config.gateway.port == 0 {
        return Err(AtelierError::Config(
            "gateway.port must be greater than zero".to_string(),
        ));
    }
    Ok(())
}
