// SPDX-FileCopyrightText: 2026 Atelier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage trait seams for conversation records and accounts.
//!
//! Lifecycle and attendance logic go through these traits and never touch
//! the underlying storage directly, so they are testable against any
//! implementation.

use async_trait::async_trait;

use crate::error::AtelierError;
use crate::types::{Account, AccountKind, ConversationRecord};

/// Durable key -> list-of-records storage for conversations, partitioned by
/// owning customer.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// All records for one owner. Empty when the owner has none.
    async fn list_by_owner(&self, owner_id: &str)
    -> Result<Vec<ConversationRecord>, AtelierError>;

    /// One record by owner and id.
    async fn get(
        &self,
        owner_id: &str,
        id: &str,
    ) -> Result<Option<ConversationRecord>, AtelierError>;

    /// One record by id alone, across all owners. Used by the attendance
    /// layer, which operates on the flattened view.
    async fn find_by_id(&self, id: &str) -> Result<Option<ConversationRecord>, AtelierError>;

    /// Insert-or-replace matched by `record.id`, unconditionally. Bumps the
    /// stored revision and returns the record as persisted.
    async fn upsert(
        &self,
        record: &ConversationRecord,
    ) -> Result<ConversationRecord, AtelierError>;

    /// Compare-and-swap write: replaces the stored record only if its
    /// revision still equals `expected_revision` (0 means "must not exist
    /// yet"). A stale writer gets [`AtelierError::Conflict`].
    async fn upsert_expected(
        &self,
        record: &ConversationRecord,
        expected_revision: u64,
    ) -> Result<ConversationRecord, AtelierError>;

    /// Deletes the matching record. [`AtelierError::NotFound`] when absent.
    async fn remove(&self, owner_id: &str, id: &str) -> Result<(), AtelierError>;

    /// Flattens every partition. Linear in total stored records; acceptable
    /// at this system's scale.
    async fn list_all(&self) -> Result<Vec<ConversationRecord>, AtelierError>;
}

/// Storage for customer and employee accounts.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn insert_account(&self, account: &Account) -> Result<(), AtelierError>;

    /// Case-insensitive lookup across both account kinds.
    async fn find_account_by_email(
        &self,
        email: &str,
    ) -> Result<Option<Account>, AtelierError>;

    async fn find_account_by_id(&self, id: &str) -> Result<Option<Account>, AtelierError>;

    async fn list_accounts(&self, kind: AccountKind) -> Result<Vec<Account>, AtelierError>;
}
