// SPDX-FileCopyrightText: 2026 Atelier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the storage traits.

use async_trait::async_trait;
use tracing::debug;

use atelier_config::StorageConfig;
use atelier_core::types::{Account, AccountKind, ConversationRecord};
use atelier_core::{AccountStore, AtelierError, ConversationStore};

use crate::database::Database;
use crate::queries;

/// SQLite-backed store for conversations and accounts.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules.
pub struct SqliteStorage {
    db: Database,
}

impl SqliteStorage {
    /// Opens the database at the configured path and runs migrations.
    pub async fn open(config: &StorageConfig) -> Result<Self, AtelierError> {
        let db = Database::open(&config.database_path, config.wal_mode).await?;
        debug!(path = %config.database_path, "SQLite storage ready");
        Ok(Self { db })
    }

    /// Checkpoints and closes the underlying connection.
    pub async fn close(self) -> Result<(), AtelierError> {
        self.db.close().await
    }
}

#[async_trait]
impl ConversationStore for SqliteStorage {
    async fn list_by_owner(
        &self,
        owner_id: &str,
    ) -> Result<Vec<ConversationRecord>, AtelierError> {
        queries::conversations::list_by_owner(&self.db, owner_id).await
    }

    async fn get(
        &self,
        owner_id: &str,
        id: &str,
    ) -> Result<Option<ConversationRecord>, AtelierError> {
        queries::conversations::get(&self.db, owner_id, id).await
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<ConversationRecord>, AtelierError> {
        queries::conversations::find_by_id(&self.db, id).await
    }

    async fn upsert(
        &self,
        record: &ConversationRecord,
    ) -> Result<ConversationRecord, AtelierError> {
        queries::conversations::upsert(&self.db, record).await
    }

    async fn upsert_expected(
        &self,
        record: &ConversationRecord,
        expected_revision: u64,
    ) -> Result<ConversationRecord, AtelierError> {
        queries::conversations::upsert_expected(&self.db, record, expected_revision).await
    }

    async fn remove(&self, owner_id: &str, id: &str) -> Result<(), AtelierError> {
        queries::conversations::remove(&self.db, owner_id, id).await
    }

    async fn list_all(&self) -> Result<Vec<ConversationRecord>, AtelierError> {
        queries::conversations::list_all(&self.db).await
    }
}

#[async_trait]
impl AccountStore for SqliteStorage {
    async fn insert_account(&self, account: &Account) -> Result<(), AtelierError> {
        queries::accounts::insert_account(&self.db, account).await
    }

    async fn find_account_by_email(
        &self,
        email: &str,
    ) -> Result<Option<Account>, AtelierError> {
        queries::accounts::find_account_by_email(&self.db, email).await
    }

    async fn find_account_by_id(&self, id: &str) -> Result<Option<Account>, AtelierError> {
        queries::accounts::find_account_by_id(&self.db, id).await
    }

    async fn list_accounts(&self, kind: AccountKind) -> Result<Vec<Account>, AtelierError> {
        queries::accounts::list_accounts(&self.db, kind).await
    }
}
