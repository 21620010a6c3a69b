// SPDX-FileCopyrightText: 2026 Atelier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `atelier serve` and `atelier seed` command implementations.
//!
//! Serve wires storage, the upstream provider, the domain services, and the
//! gateway together; the change-feed bus is shared by every service so the
//! SSE endpoint sees all mutations.

use std::sync::Arc;
use std::time::Instant;

use tracing::info;

use atelier_attendance::AttendanceService;
use atelier_auth::AuthService;
use atelier_config::AtelierConfig;
use atelier_conversations::ConversationService;
use atelier_core::{AtelierError, CompletionProvider, EventBus};
use atelier_gateway::{GatewayState, start_server};
use atelier_groq::GroqClient;
use atelier_storage::SqliteStorage;

/// Runs the `atelier serve` command.
pub async fn run_serve(config: AtelierConfig) -> Result<(), AtelierError> {
    info!(service = %config.service.name, "starting atelier serve");

    let storage = Arc::new(SqliteStorage::open(&config.storage).await?);
    info!(path = %config.storage.database_path, "storage ready");

    // Fails fast when the upstream credential is missing.
    let provider: Arc<dyn CompletionProvider> = Arc::new(GroqClient::new(&config.upstream)?);
    info!(model = %config.upstream.model, "upstream provider ready");

    let bus = EventBus::default();
    let state = GatewayState {
        conversations: Arc::new(ConversationService::new(
            storage.clone(),
            provider.clone(),
            bus.clone(),
        )),
        attendance: Arc::new(AttendanceService::new(storage.clone(), bus.clone())),
        auth: Arc::new(AuthService::new(storage.clone())),
        provider,
        bus,
        started_at: Instant::now(),
    };

    start_server(&config.gateway, state).await
}

/// Runs the `atelier seed` command: inserts demo accounts for local
/// development and exits.
pub async fn run_seed(config: AtelierConfig) -> Result<(), AtelierError> {
    let storage = SqliteStorage::open(&config.storage).await?;
    let created = atelier_auth::seed_demo_accounts(&storage).await?;
    println!("atelier seed: {created} account(s) created");
    storage.close().await
}
