// SPDX-FileCopyrightText: 2026 Atelier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation record CRUD and compare-and-swap writes.
//!
//! `messages` and `transfer_history` are JSON TEXT columns: every write
//! replaces the whole record in one transaction, so readers see either the
//! old record or the new one, never a mix.

use atelier_core::types::{Assignee, ConversationRecord, ConversationStatus};
use atelier_core::AtelierError;
use rusqlite::params;
use std::str::FromStr;

use crate::database::Database;

const SELECT_COLS: &str = "id, owner_id, category, status, assigned_agent_id, \
     assigned_agent_name, assigned_at, transfer_history, messages, created_at, \
     updated_at, closed_at, closed_by, revision";

/// Maps one row to a [`ConversationRecord`].
fn record_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ConversationRecord> {
    let category: Option<String> = row.get(2)?;
    let category = category
        .map(|c| {
            atelier_core::types::Category::from_str(&c).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    2,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })
        })
        .transpose()?;

    let status: String = row.get(3)?;
    let status = ConversationStatus::from_str(&status).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
    })?;

    let assigned_agent_id: Option<String> = row.get(4)?;
    let assigned_to = match assigned_agent_id {
        Some(agent_id) => Some(Assignee {
            agent_id,
            agent_name: row.get(5)?,
            assigned_at: row.get(6)?,
        }),
        None => None,
    };

    let transfers: String = row.get(7)?;
    let transfer_history = serde_json::from_str(&transfers).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(7, rusqlite::types::Type::Text, Box::new(e))
    })?;

    let messages: String = row.get(8)?;
    let messages = serde_json::from_str(&messages).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(8, rusqlite::types::Type::Text, Box::new(e))
    })?;

    let revision: i64 = row.get(13)?;

    Ok(ConversationRecord {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        category,
        status,
        assigned_to,
        transfer_history,
        messages,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
        closed_at: row.get(11)?,
        closed_by: row.get(12)?,
        revision: revision as u64,
    })
}

fn encode_json<T: serde::Serialize>(value: &T) -> Result<String, AtelierError> {
    serde_json::to_string(value).map_err(|e| AtelierError::Storage {
        source: Box::new(e),
    })
}

/// All records for one owner, in creation order.
pub async fn list_by_owner(
    db: &Database,
    owner_id: &str,
) -> Result<Vec<ConversationRecord>, AtelierError> {
    let owner_id = owner_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SELECT_COLS} FROM conversations \
                 WHERE owner_id = ?1 ORDER BY created_at ASC, id ASC",
            ))?;
            let rows = stmt.query_map(params![owner_id], record_from_row)?;
            let mut records = Vec::new();
            for row in rows {
                records.push(row?);
            }
            Ok(records)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// One record by owner and id.
pub async fn get(
    db: &Database,
    owner_id: &str,
    id: &str,
) -> Result<Option<ConversationRecord>, AtelierError> {
    let owner_id = owner_id.to_string();
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SELECT_COLS} FROM conversations WHERE owner_id = ?1 AND id = ?2",
            ))?;
            match stmt.query_row(params![owner_id, id], record_from_row) {
                Ok(record) => Ok(Some(record)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// One record by id alone, across all owners.
pub async fn find_by_id(
    db: &Database,
    id: &str,
) -> Result<Option<ConversationRecord>, AtelierError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SELECT_COLS} FROM conversations WHERE id = ?1",
            ))?;
            match stmt.query_row(params![id], record_from_row) {
                Ok(record) => Ok(Some(record)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Every record from every partition, in creation order.
pub async fn list_all(db: &Database) -> Result<Vec<ConversationRecord>, AtelierError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SELECT_COLS} FROM conversations ORDER BY created_at ASC, id ASC",
            ))?;
            let rows = stmt.query_map([], record_from_row)?;
            let mut records = Vec::new();
            for row in rows {
                records.push(row?);
            }
            Ok(records)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Insert-or-replace matched by id, unconditionally.
///
/// Bumps the stored revision and returns the record as persisted.
pub async fn upsert(
    db: &Database,
    record: &ConversationRecord,
) -> Result<ConversationRecord, AtelierError> {
    let transfers_json = encode_json(&record.transfer_history)?;
    let messages_json = encode_json(&record.messages)?;
    let rec = record.clone();

    let revision = db
        .connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO conversations (id, owner_id, category, status, \
                 assigned_agent_id, assigned_agent_name, assigned_at, \
                 transfer_history, messages, created_at, updated_at, \
                 closed_at, closed_by, revision) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, 1) \
                 ON CONFLICT(id) DO UPDATE SET \
                   category = excluded.category, \
                   status = excluded.status, \
                   assigned_agent_id = excluded.assigned_agent_id, \
                   assigned_agent_name = excluded.assigned_agent_name, \
                   assigned_at = excluded.assigned_at, \
                   transfer_history = excluded.transfer_history, \
                   messages = excluded.messages, \
                   updated_at = excluded.updated_at, \
                   closed_at = excluded.closed_at, \
                   closed_by = excluded.closed_by, \
                   revision = conversations.revision + 1",
                params![
                    rec.id,
                    rec.owner_id,
                    rec.category.map(|c| c.to_string()),
                    rec.status.to_string(),
                    rec.assigned_to.as_ref().map(|a| a.agent_id.clone()),
                    rec.assigned_to.as_ref().map(|a| a.agent_name.clone()),
                    rec.assigned_to.as_ref().map(|a| a.assigned_at.clone()),
                    transfers_json,
                    messages_json,
                    rec.created_at,
                    rec.updated_at,
                    rec.closed_at,
                    rec.closed_by,
                ],
            )?;
            let revision: i64 = tx.query_row(
                "SELECT revision FROM conversations WHERE id = ?1",
                params![rec.id],
                |row| row.get(0),
            )?;
            tx.commit()?;
            Ok(revision)
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    let mut stored = record.clone();
    stored.revision = revision as u64;
    Ok(stored)
}

enum CasOutcome {
    Stored(i64),
    Conflict,
    Missing,
}

/// Compare-and-swap write: replaces the stored record only if its revision
/// still equals `expected_revision`. `0` means the record must not exist yet.
///
/// A stale writer gets [`AtelierError::Conflict`] and must re-read before
/// retrying.
pub async fn upsert_expected(
    db: &Database,
    record: &ConversationRecord,
    expected_revision: u64,
) -> Result<ConversationRecord, AtelierError> {
    let transfers_json = encode_json(&record.transfer_history)?;
    let messages_json = encode_json(&record.messages)?;
    let rec = record.clone();
    let expected = expected_revision as i64;

    let outcome = db
        .connection()
        .call(move |conn| {
            if expected == 0 {
                let result = conn.execute(
                    "INSERT INTO conversations (id, owner_id, category, status, \
                     assigned_agent_id, assigned_agent_name, assigned_at, \
                     transfer_history, messages, created_at, updated_at, \
                     closed_at, closed_by, revision) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, 1)",
                    params![
                        rec.id,
                        rec.owner_id,
                        rec.category.map(|c| c.to_string()),
                        rec.status.to_string(),
                        rec.assigned_to.as_ref().map(|a| a.agent_id.clone()),
                        rec.assigned_to.as_ref().map(|a| a.agent_name.clone()),
                        rec.assigned_to.as_ref().map(|a| a.assigned_at.clone()),
                        transfers_json,
                        messages_json,
                        rec.created_at,
                        rec.updated_at,
                        rec.closed_at,
                        rec.closed_by,
                    ],
                );
                match result {
                    Ok(_) => Ok(CasOutcome::Stored(1)),
                    Err(rusqlite::Error::SqliteFailure(e, _))
                        if e.code == rusqlite::ErrorCode::ConstraintViolation =>
                    {
                        Ok(CasOutcome::Conflict)
                    }
                    Err(e) => Err(e.into()),
                }
            } else {
                let changed = conn.execute(
                    "UPDATE conversations SET \
                       category = ?1, status = ?2, \
                       assigned_agent_id = ?3, assigned_agent_name = ?4, assigned_at = ?5, \
                       transfer_history = ?6, messages = ?7, updated_at = ?8, \
                       closed_at = ?9, closed_by = ?10, revision = ?11 \
                     WHERE id = ?12 AND revision = ?13",
                    params![
                        rec.category.map(|c| c.to_string()),
                        rec.status.to_string(),
                        rec.assigned_to.as_ref().map(|a| a.agent_id.clone()),
                        rec.assigned_to.as_ref().map(|a| a.agent_name.clone()),
                        rec.assigned_to.as_ref().map(|a| a.assigned_at.clone()),
                        transfers_json,
                        messages_json,
                        rec.updated_at,
                        rec.closed_at,
                        rec.closed_by,
                        expected + 1,
                        rec.id,
                        expected,
                    ],
                )?;
                if changed == 1 {
                    Ok(CasOutcome::Stored(expected + 1))
                } else {
                    let exists: bool = conn
                        .query_row(
                            "SELECT 1 FROM conversations WHERE id = ?1",
                            params![rec.id],
                            |_| Ok(true),
                        )
                        .or_else(|e| match e {
                            rusqlite::Error::QueryReturnedNoRows => Ok(false),
                            other => Err(other),
                        })?;
                    if exists {
                        Ok(CasOutcome::Conflict)
                    } else {
                        Ok(CasOutcome::Missing)
                    }
                }
            }
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    match outcome {
        CasOutcome::Stored(revision) => {
            let mut stored = record.clone();
            stored.revision = revision as u64;
            Ok(stored)
        }
        CasOutcome::Conflict => Err(AtelierError::Conflict {
            id: record.id.clone(),
        }),
        CasOutcome::Missing => Err(AtelierError::NotFound {
            entity: "conversation",
            id: record.id.clone(),
        }),
    }
}

/// Deletes the matching record. Typed `NotFound` when absent.
pub async fn remove(db: &Database, owner_id: &str, id: &str) -> Result<(), AtelierError> {
    let owner_id = owner_id.to_string();
    let id = id.to_string();
    let id_for_err = id.clone();
    let deleted = db
        .connection()
        .call(move |conn| {
            let changed = conn.execute(
                "DELETE FROM conversations WHERE owner_id = ?1 AND id = ?2",
                params![owner_id, id],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    if deleted {
        Ok(())
    } else {
        Err(AtelierError::NotFound {
            entity: "conversation",
            id: id_for_err,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atelier_core::types::{
        AgentIdentity, ChatMessage, MessageRole, Sentiment, Transfer, now_timestamp,
    };
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap(), true).await.unwrap();
        (db, dir)
    }

    fn make_record(id: &str, owner: &str) -> ConversationRecord {
        ConversationRecord {
            id: id.to_string(),
            owner_id: owner.to_string(),
            category: Some(atelier_core::types::Category::Orders),
            status: ConversationStatus::Active,
            assigned_to: None,
            transfer_history: vec![],
            messages: vec![ChatMessage::bot("Hello!")],
            created_at: now_timestamp(),
            updated_at: now_timestamp(),
            closed_at: None,
            closed_by: None,
            revision: 0,
        }
    }

    #[tokio::test]
    async fn upsert_then_list_roundtrips_deep_equal() {
        let (db, _dir) = setup_db().await;
        let mut record = make_record("conv-1", "user-1");
        record.messages.push(ChatMessage::customer(
            "my order is late",
            Sentiment::Negative,
        ));
        record.assigned_to = Some(Assignee {
            agent_id: "emp-1".into(),
            agent_name: "Ana".into(),
            assigned_at: now_timestamp(),
        });
        record.status = ConversationStatus::InProgress;
        record.transfer_history.push(Transfer {
            from: None,
            to: Assignee {
                agent_id: "emp-1".into(),
                agent_name: "Ana".into(),
                assigned_at: now_timestamp(),
            },
            at: now_timestamp(),
        });
        record.messages.push(ChatMessage::agent(
            "Looking into it now.",
            AgentIdentity {
                agent_id: "emp-1".into(),
                agent_name: "Ana".into(),
            },
        ));

        let stored = upsert(&db, &record).await.unwrap();
        assert_eq!(stored.revision, 1);

        let listed = list_by_owner(&db, "user-1").await.unwrap();
        assert_eq!(listed.len(), 1);
        let mut expected = record.clone();
        expected.revision = 1;
        assert_eq!(listed[0], expected);

        let all = list_all(&db).await.unwrap();
        assert_eq!(all[0], expected);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn upsert_replaces_in_place_and_bumps_revision() {
        let (db, _dir) = setup_db().await;
        let record = make_record("conv-1", "user-1");
        upsert(&db, &record).await.unwrap();

        let mut updated = record.clone();
        updated.messages.push(ChatMessage::customer("hello?", Sentiment::Neutral));
        let stored = upsert(&db, &updated).await.unwrap();
        assert_eq!(stored.revision, 2);

        let listed = list_by_owner(&db, "user-1").await.unwrap();
        assert_eq!(listed.len(), 1, "replace must not duplicate");
        assert_eq!(listed[0].messages.len(), 2);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn upsert_expected_rejects_stale_revision() {
        let (db, _dir) = setup_db().await;
        let record = make_record("conv-1", "user-1");
        let stored = upsert_expected(&db, &record, 0).await.unwrap();
        assert_eq!(stored.revision, 1);

        // A writer holding revision 1 succeeds.
        let next = upsert_expected(&db, &stored, 1).await.unwrap();
        assert_eq!(next.revision, 2);

        // A second writer still holding revision 1 is stale.
        let err = upsert_expected(&db, &stored, 1).await.unwrap_err();
        assert!(matches!(err, AtelierError::Conflict { .. }), "got: {err}");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn upsert_expected_insert_conflicts_on_existing_id() {
        let (db, _dir) = setup_db().await;
        let record = make_record("conv-1", "user-1");
        upsert_expected(&db, &record, 0).await.unwrap();

        let err = upsert_expected(&db, &record, 0).await.unwrap_err();
        assert!(matches!(err, AtelierError::Conflict { .. }), "got: {err}");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn upsert_expected_missing_record_is_not_found() {
        let (db, _dir) = setup_db().await;
        let record = make_record("conv-ghost", "user-1");
        let err = upsert_expected(&db, &record, 3).await.unwrap_err();
        assert!(matches!(err, AtelierError::NotFound { .. }), "got: {err}");
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn get_scopes_by_owner() {
        let (db, _dir) = setup_db().await;
        upsert(&db, &make_record("conv-1", "user-1")).await.unwrap();

        assert!(get(&db, "user-1", "conv-1").await.unwrap().is_some());
        assert!(get(&db, "user-2", "conv-1").await.unwrap().is_none());
        assert!(find_by_id(&db, "conv-1").await.unwrap().is_some());
        assert!(find_by_id(&db, "conv-9").await.unwrap().is_none());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn list_all_flattens_every_partition() {
        let (db, _dir) = setup_db().await;
        upsert(&db, &make_record("conv-1", "user-1")).await.unwrap();
        upsert(&db, &make_record("conv-2", "user-1")).await.unwrap();
        upsert(&db, &make_record("conv-3", "user-2")).await.unwrap();

        let all = list_all(&db).await.unwrap();
        assert_eq!(all.len(), 3);

        let mine = list_by_owner(&db, "user-2").await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, "conv-3");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn remove_deletes_and_reports_missing() {
        let (db, _dir) = setup_db().await;
        upsert(&db, &make_record("conv-1", "user-1")).await.unwrap();

        remove(&db, "user-1", "conv-1").await.unwrap();
        assert!(get(&db, "user-1", "conv-1").await.unwrap().is_none());

        let err = remove(&db, "user-1", "conv-1").await.unwrap_err();
        assert!(matches!(err, AtelierError::NotFound { .. }), "got: {err}");

        db.close().await.unwrap();
    }
}
