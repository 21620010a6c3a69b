// SPDX-FileCopyrightText: 2026 Atelier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Account CRUD operations.

use atelier_core::types::{Account, AccountKind};
use atelier_core::AtelierError;
use rusqlite::params;
use std::str::FromStr;

use crate::database::Database;

const SELECT_COLS: &str = "id, kind, name, email, phone, password_hash, created_at";

fn account_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Account> {
    let kind: String = row.get(1)?;
    let kind = AccountKind::from_str(&kind).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(Account {
        id: row.get(0)?,
        kind,
        name: row.get(2)?,
        email: row.get(3)?,
        phone: row.get(4)?,
        password_hash: row.get(5)?,
        created_at: row.get(6)?,
    })
}

/// Insert a new account. A duplicate email surfaces as a field-level
/// validation error, mirroring the unique index.
pub async fn insert_account(db: &Database, account: &Account) -> Result<(), AtelierError> {
    let acc = account.clone();
    let inserted = db
        .connection()
        .call(move |conn| {
            let result = conn.execute(
                "INSERT INTO accounts (id, kind, name, email, phone, password_hash, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    acc.id,
                    acc.kind.to_string(),
                    acc.name,
                    acc.email,
                    acc.phone,
                    acc.password_hash,
                    acc.created_at,
                ],
            );
            match result {
                Ok(_) => Ok(true),
                Err(rusqlite::Error::SqliteFailure(e, _))
                    if e.code == rusqlite::ErrorCode::ConstraintViolation =>
                {
                    Ok(false)
                }
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    if inserted {
        Ok(())
    } else {
        Err(AtelierError::Validation {
            field: "email",
            message: "this email is already registered".to_string(),
        })
    }
}

/// Case-insensitive lookup across both account kinds.
pub async fn find_account_by_email(
    db: &Database,
    email: &str,
) -> Result<Option<Account>, AtelierError> {
    let email = email.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SELECT_COLS} FROM accounts WHERE email = ?1 COLLATE NOCASE",
            ))?;
            match stmt.query_row(params![email], account_from_row) {
                Ok(account) => Ok(Some(account)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// One account by id.
pub async fn find_account_by_id(
    db: &Database,
    id: &str,
) -> Result<Option<Account>, AtelierError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SELECT_COLS} FROM accounts WHERE id = ?1",
            ))?;
            match stmt.query_row(params![id], account_from_row) {
                Ok(account) => Ok(Some(account)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// All accounts of one kind, in registration order.
pub async fn list_accounts(
    db: &Database,
    kind: AccountKind,
) -> Result<Vec<Account>, AtelierError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SELECT_COLS} FROM accounts WHERE kind = ?1 \
                 ORDER BY created_at ASC, id ASC",
            ))?;
            let rows = stmt.query_map(params![kind.to_string()], account_from_row)?;
            let mut accounts = Vec::new();
            for row in rows {
                accounts.push(row?);
            }
            Ok(accounts)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
