// SPDX-FileCopyrightText: 2026 Atelier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Demo account fixtures for local development.

use atelier_core::types::{Account, AccountKind, now_timestamp};
use atelier_core::{AccountStore, AtelierError};
use tracing::info;

use crate::service::hash_password;

/// All demo fixtures share this password.
pub const DEMO_PASSWORD: &str = "123456";

/// Inserts demo accounts (two customers, one employee) unless an account
/// with the same email already exists. Returns how many were created.
pub async fn seed_demo_accounts(store: &dyn AccountStore) -> Result<usize, AtelierError> {
    let fixtures = [
        (
            AccountKind::Customer,
            "Joan Customer",
            "joan@example.com",
            Some("+55 21 98765-4321"),
        ),
        (
            AccountKind::Customer,
            "Maria Customer",
            "maria@example.com",
            Some("+55 21 98765-1234"),
        ),
        (
            AccountKind::Employee,
            "Ana Agent",
            "ana@fashionstore.example",
            None,
        ),
    ];

    let mut created = 0;
    for (kind, name, email, phone) in fixtures {
        if store.find_account_by_email(email).await?.is_some() {
            continue;
        }
        let account = Account {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.map(str::to_string),
            password_hash: hash_password(DEMO_PASSWORD)?,
            created_at: now_timestamp(),
        };
        store.insert_account(&account).await?;
        info!(email, kind = %kind, "seeded demo account");
        created += 1;
    }
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use atelier_config::StorageConfig;
    use atelier_storage::SqliteStorage;
    use tempfile::tempdir;

    #[tokio::test]
    async fn seeding_is_idempotent() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("seed.db");
        let storage = SqliteStorage::open(&StorageConfig {
            database_path: db_path.to_str().unwrap().to_string(),
            wal_mode: true,
        })
        .await
        .unwrap();

        let created = seed_demo_accounts(&storage).await.unwrap();
        assert_eq!(created, 3);

        let created_again = seed_demo_accounts(&storage).await.unwrap();
        assert_eq!(created_again, 0);

        let customers = store_customers(&storage).await;
        assert_eq!(customers, 2);
    }

    async fn store_customers(storage: &SqliteStorage) -> usize {
        use atelier_core::AccountStore;
        storage
            .list_accounts(AccountKind::Customer)
            .await
            .unwrap()
            .len()
    }
}
