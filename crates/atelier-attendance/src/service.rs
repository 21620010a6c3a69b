// SPDX-FileCopyrightText: 2026 Atelier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Attendance service: persists state-machine transitions with
//! compare-and-swap writes and publishes change-feed events.
//!
//! A transition is computed on a fresh read and written conditionally on
//! the revision it was read at. If another writer races in between, the
//! record is re-read and the transition re-applied, so the loser of a
//! claim race receives `AlreadyAssigned` naming the winner instead of
//! silently overwriting them.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use atelier_conversations::lifecycle;
use atelier_conversations::query::{StatusFilter, filter_by_status, sort_by_recency};
use atelier_core::events::ConversationEvent;
use atelier_core::types::{
    AgentIdentity, AttendanceState, ChatMessage, ConversationRecord, MessageRole,
};
use atelier_core::{AtelierError, ConversationStore, EventBus};

use crate::machine;

/// Queue counters, recomputed on demand from the full record set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AttendanceStats {
    pub total: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub closed: usize,
    /// Conversations assigned to the requesting employee, open or closed.
    pub mine: usize,
}

/// Employee-facing operations over the flattened conversation set.
pub struct AttendanceService {
    store: Arc<dyn ConversationStore>,
    bus: EventBus,
}

impl AttendanceService {
    pub fn new(store: Arc<dyn ConversationStore>, bus: EventBus) -> Self {
        Self { store, bus }
    }

    /// Claims a pending conversation for the given agent.
    pub async fn claim(
        &self,
        id: &str,
        agent_id: &str,
        agent_name: &str,
    ) -> Result<ConversationRecord, AtelierError> {
        let stored = self
            .apply(id, |record| machine::claim(record, agent_id, agent_name))
            .await?;
        info!(conversation_id = %id, agent_id, "conversation claimed");
        self.bus.publish(ConversationEvent::Claimed {
            conversation_id: stored.id.clone(),
            owner_id: stored.owner_id.clone(),
            agent_id: agent_id.to_string(),
            agent_name: agent_name.to_string(),
        });
        Ok(stored)
    }

    /// Transfers an assigned conversation to a different agent.
    pub async fn transfer(
        &self,
        id: &str,
        new_agent_id: &str,
        new_agent_name: &str,
    ) -> Result<ConversationRecord, AtelierError> {
        let stored = self
            .apply(id, |record| {
                machine::transfer(record, new_agent_id, new_agent_name)
            })
            .await?;
        let from_agent_id = stored
            .transfer_history
            .last()
            .and_then(|t| t.from.as_ref())
            .map(|a| a.agent_id.clone());
        info!(conversation_id = %id, new_agent_id, "conversation transferred");
        self.bus.publish(ConversationEvent::Transferred {
            conversation_id: stored.id.clone(),
            owner_id: stored.owner_id.clone(),
            from_agent_id,
            to_agent_id: new_agent_id.to_string(),
            to_agent_name: new_agent_name.to_string(),
        });
        Ok(stored)
    }

    /// Closes an assigned conversation. The closer must be its assignee.
    pub async fn close(
        &self,
        id: &str,
        agent_id: &str,
    ) -> Result<ConversationRecord, AtelierError> {
        let stored = self
            .apply(id, |record| machine::close(record, agent_id))
            .await?;
        info!(conversation_id = %id, agent_id, "conversation closed");
        self.bus.publish(ConversationEvent::Closed {
            conversation_id: stored.id.clone(),
            owner_id: stored.owner_id.clone(),
            agent_id: agent_id.to_string(),
        });
        Ok(stored)
    }

    /// Appends an agent reply. Only the current assignee may reply.
    pub async fn reply(
        &self,
        id: &str,
        agent_id: &str,
        agent_name: &str,
        text: &str,
    ) -> Result<ConversationRecord, AtelierError> {
        let message = ChatMessage::agent(
            text,
            AgentIdentity {
                agent_id: agent_id.to_string(),
                agent_name: agent_name.to_string(),
            },
        );
        let stored = self
            .apply(id, |record| {
                match record.attendance_state() {
                    AttendanceState::Closed => Err(AtelierError::InvalidTransition {
                        state: AttendanceState::Closed,
                        operation: "reply to",
                    }),
                    AttendanceState::Pending => Err(AtelierError::InvalidTransition {
                        state: AttendanceState::Pending,
                        operation: "reply to",
                    }),
                    AttendanceState::Assigned => {
                        let assignee = record.assigned_to.as_ref();
                        if assignee.map(|a| a.agent_id.as_str()) != Some(agent_id) {
                            return Err(AtelierError::NotAssignee {
                                agent_id: agent_id.to_string(),
                            });
                        }
                        Ok(lifecycle::append_message(record, message.clone()))
                    }
                }
            })
            .await?;
        self.bus.publish(ConversationEvent::MessageAppended {
            conversation_id: stored.id.clone(),
            owner_id: stored.owner_id.clone(),
            role: MessageRole::Agent,
        });
        Ok(stored)
    }

    /// The attendance queue: every conversation across all customers,
    /// filtered by state and sorted most-recent first.
    pub async fn queue(
        &self,
        filter: StatusFilter,
    ) -> Result<Vec<ConversationRecord>, AtelierError> {
        let all = self.store.list_all().await?;
        Ok(sort_by_recency(filter_by_status(&all, filter)))
    }

    /// Open conversations assigned to one employee.
    pub async fn conversations_for_employee(
        &self,
        agent_id: &str,
    ) -> Result<Vec<ConversationRecord>, AtelierError> {
        let all = self.store.list_all().await?;
        let mine = all
            .into_iter()
            .filter(|record| {
                record.attendance_state() == AttendanceState::Assigned
                    && record
                        .assigned_to
                        .as_ref()
                        .is_some_and(|a| a.agent_id == agent_id)
            })
            .collect();
        Ok(sort_by_recency(mine))
    }

    /// One conversation from the flattened view, or a typed `NotFound`.
    pub async fn get(&self, id: &str) -> Result<ConversationRecord, AtelierError> {
        self.find(id).await
    }

    /// Aggregates queue counters. Recomputed on every call, never cached:
    /// staleness is bounded by the caller, and the change feed covers the
    /// gap between reads.
    pub async fn stats(
        &self,
        employee_id: Option<&str>,
    ) -> Result<AttendanceStats, AtelierError> {
        let all = self.store.list_all().await?;
        let mut stats = AttendanceStats {
            total: all.len(),
            pending: 0,
            in_progress: 0,
            closed: 0,
            mine: 0,
        };
        for record in &all {
            match record.attendance_state() {
                AttendanceState::Pending => stats.pending += 1,
                AttendanceState::Assigned => stats.in_progress += 1,
                AttendanceState::Closed => stats.closed += 1,
            }
            if let Some(employee_id) = employee_id {
                if record
                    .assigned_to
                    .as_ref()
                    .is_some_and(|a| a.agent_id == employee_id)
                {
                    stats.mine += 1;
                }
            }
        }
        debug!(?stats, "attendance stats computed");
        Ok(stats)
    }

    async fn find(&self, id: &str) -> Result<ConversationRecord, AtelierError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| AtelierError::NotFound {
                entity: "conversation",
                id: id.to_string(),
            })
    }

    /// Read-transition-CAS with one retry on a revision conflict. The retry
    /// re-applies the transition to the fresh record, so the caller gets the
    /// accurate domain error when the race changed the state under them.
    async fn apply<F>(&self, id: &str, transition: F) -> Result<ConversationRecord, AtelierError>
    where
        F: Fn(&ConversationRecord) -> Result<ConversationRecord, AtelierError>,
    {
        let current = self.find(id).await?;
        let updated = transition(&current)?;
        match self.store.upsert_expected(&updated, current.revision).await {
            Err(AtelierError::Conflict { .. }) => {
                let fresh = self.find(id).await?;
                let updated = transition(&fresh)?;
                self.store.upsert_expected(&updated, fresh.revision).await
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atelier_config::StorageConfig;
    use atelier_conversations::lifecycle::new_conversation;
    use atelier_storage::SqliteStorage;
    use tempfile::tempdir;

    async fn setup() -> (AttendanceService, Arc<SqliteStorage>, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("attendance.db");
        let storage = Arc::new(
            SqliteStorage::open(&StorageConfig {
                database_path: db_path.to_str().unwrap().to_string(),
                wal_mode: true,
            })
            .await
            .unwrap(),
        );
        let service = AttendanceService::new(storage.clone(), EventBus::default());
        (service, storage, dir)
    }

    async fn seed_pending(storage: &SqliteStorage, owner: &str) -> ConversationRecord {
        let record = new_conversation(owner, None);
        storage.upsert_expected(&record, 0).await.unwrap()
    }

    #[tokio::test]
    async fn full_handoff_scenario() {
        let (service, storage, _dir) = setup().await;
        let record = seed_pending(&storage, "u1").await;

        let claimed = service.claim(&record.id, "agentA", "Alice").await.unwrap();
        assert_eq!(claimed.assigned_to.as_ref().unwrap().agent_id, "agentA");

        let transferred = service
            .transfer(&record.id, "agentB", "Bruno")
            .await
            .unwrap();
        assert_eq!(transferred.assigned_to.as_ref().unwrap().agent_id, "agentB");
        assert_eq!(transferred.transfer_history.len(), 1);
        assert_eq!(
            transferred.transfer_history[0]
                .from
                .as_ref()
                .unwrap()
                .agent_id,
            "agentA"
        );

        let closed = service.close(&record.id, "agentB").await.unwrap();
        assert_eq!(closed.closed_by.as_deref(), Some("agentB"));

        let err = service
            .claim(&record.id, "agentC", "Carla")
            .await
            .unwrap_err();
        assert!(
            matches!(err, AtelierError::InvalidTransition { .. }),
            "got: {err}"
        );
    }

    #[tokio::test]
    async fn losing_claimer_gets_already_assigned_not_a_silent_overwrite() {
        let (service, storage, _dir) = setup().await;
        let record = seed_pending(&storage, "u1").await;

        // Both agents read the same pending snapshot.
        let snapshot = storage.find_by_id(&record.id).await.unwrap().unwrap();

        // Agent A wins the race through the CAS write.
        let a_claim = machine::claim(&snapshot, "agentA", "Alice").unwrap();
        storage
            .upsert_expected(&a_claim, snapshot.revision)
            .await
            .unwrap();

        // Agent B's stale write is rejected outright by the store.
        let b_claim = machine::claim(&snapshot, "agentB", "Bruno").unwrap();
        let err = storage
            .upsert_expected(&b_claim, snapshot.revision)
            .await
            .unwrap_err();
        assert!(matches!(err, AtelierError::Conflict { .. }));

        // Through the service, agent B gets the accurate domain error.
        let err = service
            .claim(&record.id, "agentB", "Bruno")
            .await
            .unwrap_err();
        match err {
            AtelierError::AlreadyAssigned { agent_name, .. } => assert_eq!(agent_name, "Alice"),
            other => panic!("expected AlreadyAssigned, got: {other}"),
        }

        // Agent A is still the assignee.
        let stored = storage.find_by_id(&record.id).await.unwrap().unwrap();
        assert_eq!(stored.assigned_to.as_ref().unwrap().agent_id, "agentA");
    }

    #[tokio::test]
    async fn reply_requires_the_assignee() {
        let (service, storage, _dir) = setup().await;
        let record = seed_pending(&storage, "u1").await;

        let err = service
            .reply(&record.id, "agentA", "Alice", "hello")
            .await
            .unwrap_err();
        assert!(matches!(err, AtelierError::InvalidTransition { .. }));

        service.claim(&record.id, "agentA", "Alice").await.unwrap();

        let err = service
            .reply(&record.id, "agentB", "Bruno", "hello")
            .await
            .unwrap_err();
        assert!(matches!(err, AtelierError::NotAssignee { .. }));

        let stored = service
            .reply(&record.id, "agentA", "Alice", "How can I help?")
            .await
            .unwrap();
        let last = stored.last_message().unwrap();
        assert_eq!(last.role, MessageRole::Agent);
        assert_eq!(last.sender.as_ref().unwrap().agent_name, "Alice");
    }

    #[tokio::test]
    async fn queue_filters_and_sorts_across_owners() {
        let (service, storage, _dir) = setup().await;
        let c1 = seed_pending(&storage, "u1").await;
        let _c2 = seed_pending(&storage, "u2").await;
        let c3 = seed_pending(&storage, "u3").await;

        service.claim(&c1.id, "agentA", "Alice").await.unwrap();
        service.claim(&c3.id, "agentA", "Alice").await.unwrap();
        service.close(&c3.id, "agentA").await.unwrap();

        assert_eq!(service.queue(StatusFilter::All).await.unwrap().len(), 3);
        assert_eq!(service.queue(StatusFilter::Pending).await.unwrap().len(), 1);
        assert_eq!(service.queue(StatusFilter::Assigned).await.unwrap().len(), 1);
        assert_eq!(service.queue(StatusFilter::Closed).await.unwrap().len(), 1);

        let mine = service.conversations_for_employee("agentA").await.unwrap();
        assert_eq!(mine.len(), 1, "closed assignments leave the open list");
        assert_eq!(mine[0].id, c1.id);
    }

    #[tokio::test]
    async fn stats_counters_are_consistent() {
        let (service, storage, _dir) = setup().await;
        let c1 = seed_pending(&storage, "u1").await;
        let _c2 = seed_pending(&storage, "u1").await;
        let c3 = seed_pending(&storage, "u2").await;
        let c4 = seed_pending(&storage, "u3").await;

        service.claim(&c1.id, "agentA", "Alice").await.unwrap();
        service.claim(&c3.id, "agentB", "Bruno").await.unwrap();
        service.claim(&c4.id, "agentA", "Alice").await.unwrap();
        service.close(&c4.id, "agentA").await.unwrap();

        let stats = service.stats(Some("agentA")).await.unwrap();
        assert_eq!(stats.total, 4);
        assert_eq!(stats.pending + stats.in_progress + stats.closed, stats.total);
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.in_progress, 2);
        assert_eq!(stats.closed, 1);
        // Counts A's closed conversation too.
        assert_eq!(stats.mine, 2);

        let anonymous = service.stats(None).await.unwrap();
        assert_eq!(anonymous.mine, 0);
    }

    #[tokio::test]
    async fn events_are_published_for_transitions() {
        let (service, storage, _dir) = setup().await;
        let record = seed_pending(&storage, "u1").await;

        let mut rx = service.bus.subscribe();
        service.claim(&record.id, "agentA", "Alice").await.unwrap();
        service.close(&record.id, "agentA").await.unwrap();

        match rx.recv().await.unwrap() {
            ConversationEvent::Claimed { agent_id, .. } => assert_eq!(agent_id, "agentA"),
            other => panic!("expected Claimed, got: {other:?}"),
        }
        match rx.recv().await.unwrap() {
            ConversationEvent::Closed { agent_id, .. } => assert_eq!(agent_id, "agentA"),
            other => panic!("expected Closed, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_conversation_is_typed_not_found() {
        let (service, _storage, _dir) = setup().await;
        let err = service.claim("conv-ghost", "agentA", "Alice").await.unwrap_err();
        assert!(matches!(err, AtelierError::NotFound { .. }));
    }
}
