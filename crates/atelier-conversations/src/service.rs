// SPDX-FileCopyrightText: 2026 Atelier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persisting conversation service for the customer side of the desk.
//!
//! Writes go through the store's compare-and-swap primitive: a transform is
//! applied to a fresh read and retried once if another writer got there
//! first, so no mutation is ever silently lost.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use atelier_core::events::ConversationEvent;
use atelier_core::types::{
    Category, ChatMessage, ConversationRecord, ConversationStatus, MessageRole, PromptMessage,
};
use atelier_core::{AtelierError, CompletionProvider, ConversationStore, EventBus};

use crate::lifecycle;
use crate::prompts::system_prompt;
use crate::sentiment::analyze_sentiment;

/// Fallback reply used when the upstream assistant cannot be reached. The
/// automatic offer to escalate to a human is a feature, not just an error
/// path.
pub const FALLBACK_REPLY: &str = "\
    I'm having trouble reaching our assistant right now. \
    Would you like me to transfer you to a human agent? \
    One of our team members will pick up this conversation as soon as possible.";

/// Result of one customer chat turn.
#[derive(Debug, Clone, Serialize)]
pub struct ChatTurn {
    /// The conversation as persisted after the turn.
    pub conversation: ConversationRecord,
    /// The reply appended for this turn (bot answer or fallback).
    pub reply: ChatMessage,
    /// True when the reply is the fallback hand-off offer.
    pub escalation_offered: bool,
}

/// Conversation lifecycle operations, persisted via the record store.
pub struct ConversationService {
    store: Arc<dyn ConversationStore>,
    provider: Arc<dyn CompletionProvider>,
    bus: EventBus,
}

impl ConversationService {
    pub fn new(
        store: Arc<dyn ConversationStore>,
        provider: Arc<dyn CompletionProvider>,
        bus: EventBus,
    ) -> Self {
        Self {
            store,
            provider,
            bus,
        }
    }

    /// Creates and persists a new conversation for `owner_id`.
    pub async fn create(
        &self,
        owner_id: &str,
        category: Option<Category>,
    ) -> Result<ConversationRecord, AtelierError> {
        let record = lifecycle::new_conversation(owner_id, category);
        let stored = self.store.upsert_expected(&record, 0).await?;
        debug!(conversation_id = %stored.id, owner_id, "conversation created");
        self.bus.publish(ConversationEvent::Created {
            conversation_id: stored.id.clone(),
            owner_id: stored.owner_id.clone(),
        });
        Ok(stored)
    }

    /// All conversations owned by `owner_id`, in creation order.
    pub async fn list(&self, owner_id: &str) -> Result<Vec<ConversationRecord>, AtelierError> {
        self.store.list_by_owner(owner_id).await
    }

    /// One conversation, or a typed `NotFound`.
    pub async fn get(
        &self,
        owner_id: &str,
        id: &str,
    ) -> Result<ConversationRecord, AtelierError> {
        self.store
            .get(owner_id, id)
            .await?
            .ok_or_else(|| AtelierError::NotFound {
                entity: "conversation",
                id: id.to_string(),
            })
    }

    /// Runs one customer chat turn: appends the customer message (sentiment
    /// tagged), asks the upstream assistant, and appends its reply. If the
    /// upstream is unreachable or rejects the call, the reply is the
    /// fallback hand-off offer instead and the turn still succeeds.
    pub async fn chat_turn(
        &self,
        owner_id: &str,
        id: &str,
        text: &str,
    ) -> Result<ChatTurn, AtelierError> {
        let current = self.get(owner_id, id).await?;
        reject_closed(&current, "message")?;

        let customer_msg = ChatMessage::customer(text, analyze_sentiment(text));

        let mut history = prompt_history(&current.messages);
        history.push(PromptMessage::user(text));

        let (reply, escalation_offered) = match self
            .provider
            .complete(&system_prompt(current.category), &history)
            .await
        {
            Ok(answer) => (ChatMessage::bot(answer), false),
            Err(e @ AtelierError::UpstreamRejected { .. })
            | Err(e @ AtelierError::UpstreamUnavailable { .. }) => {
                warn!(conversation_id = %id, error = %e, "upstream failed; offering hand-off");
                (ChatMessage::bot(FALLBACK_REPLY), true)
            }
            Err(e) => return Err(e),
        };

        let turn_messages = vec![customer_msg, reply.clone()];
        let stored = self
            .apply(owner_id, id, |record| {
                reject_closed(record, "message")?;
                Ok(lifecycle::append_messages(record, turn_messages.clone()))
            })
            .await?;

        for role in [MessageRole::Customer, reply.role] {
            self.bus.publish(ConversationEvent::MessageAppended {
                conversation_id: stored.id.clone(),
                owner_id: stored.owner_id.clone(),
                role,
            });
        }

        Ok(ChatTurn {
            conversation: stored,
            reply,
            escalation_offered,
        })
    }

    /// Appends a customer message without consulting the upstream assistant.
    pub async fn append_customer_message(
        &self,
        owner_id: &str,
        id: &str,
        text: &str,
    ) -> Result<ConversationRecord, AtelierError> {
        let message = ChatMessage::customer(text, analyze_sentiment(text));
        let stored = self
            .apply(owner_id, id, |record| {
                reject_closed(record, "message")?;
                Ok(lifecycle::append_message(record, message.clone()))
            })
            .await?;
        self.bus.publish(ConversationEvent::MessageAppended {
            conversation_id: stored.id.clone(),
            owner_id: stored.owner_id.clone(),
            role: MessageRole::Customer,
        });
        Ok(stored)
    }

    /// Sets the conversation's category. Idempotent overwrite; appends a
    /// confirmation message.
    pub async fn select_category(
        &self,
        owner_id: &str,
        id: &str,
        category: Category,
    ) -> Result<ConversationRecord, AtelierError> {
        let stored = self
            .apply(owner_id, id, |record| {
                reject_closed(record, "recategorize")?;
                Ok(lifecycle::set_category(record, category))
            })
            .await?;
        self.bus.publish(ConversationEvent::MessageAppended {
            conversation_id: stored.id.clone(),
            owner_id: stored.owner_id.clone(),
            role: MessageRole::Bot,
        });
        Ok(stored)
    }

    /// Deletes the conversation entirely. Irreversible.
    pub async fn delete(&self, owner_id: &str, id: &str) -> Result<(), AtelierError> {
        self.store.remove(owner_id, id).await?;
        self.bus.publish(ConversationEvent::Deleted {
            conversation_id: id.to_string(),
            owner_id: owner_id.to_string(),
        });
        Ok(())
    }

    /// Read-transform-CAS with one retry: on a revision conflict the record
    /// is re-read and the transform re-applied, so a concurrent writer costs
    /// one round-trip instead of a lost update.
    async fn apply<F>(
        &self,
        owner_id: &str,
        id: &str,
        transform: F,
    ) -> Result<ConversationRecord, AtelierError>
    where
        F: Fn(&ConversationRecord) -> Result<ConversationRecord, AtelierError>,
    {
        let current = self.get(owner_id, id).await?;
        let updated = transform(&current)?;
        match self.store.upsert_expected(&updated, current.revision).await {
            Err(AtelierError::Conflict { .. }) => {
                let fresh = self.get(owner_id, id).await?;
                let updated = transform(&fresh)?;
                self.store.upsert_expected(&updated, fresh.revision).await
            }
            other => other,
        }
    }
}

fn reject_closed(
    record: &ConversationRecord,
    operation: &'static str,
) -> Result<(), AtelierError> {
    if record.status == ConversationStatus::Closed {
        return Err(AtelierError::InvalidTransition {
            state: record.attendance_state(),
            operation,
        });
    }
    Ok(())
}

/// Maps the stored transcript into upstream role/content pairs. Customer
/// text becomes `user`; bot and agent text both read as `assistant` to the
/// model.
fn prompt_history(messages: &[ChatMessage]) -> Vec<PromptMessage> {
    messages
        .iter()
        .map(|msg| match msg.role {
            MessageRole::Customer => PromptMessage::user(msg.text.clone()),
            MessageRole::Bot | MessageRole::Agent => PromptMessage::assistant(msg.text.clone()),
        })
        .collect()
}
