// SPDX-FileCopyrightText: 2026 Atelier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pure conversation transforms.
//!
//! These functions build new record values and never touch storage, so the
//! same code serves both the persisting service and optimistic UI updates
//! that run ahead of the store round-trip.

use atelier_core::types::{
    Category, ChatMessage, ConversationRecord, ConversationStatus, now_timestamp,
};

/// Greeting used as the sole initial message of every new conversation.
pub const GREETING: &str = "Hello! Welcome to Fashion Store!\n\n\
    I'm the virtual assistant and I'm here to help you. How can I assist you today?";

/// Builds a new active conversation with the synthesized greeting.
pub fn new_conversation(owner_id: &str, category: Option<Category>) -> ConversationRecord {
    let now = now_timestamp();
    ConversationRecord {
        id: format!("conv_{}", uuid::Uuid::new_v4()),
        owner_id: owner_id.to_string(),
        category,
        status: ConversationStatus::Active,
        assigned_to: None,
        transfer_history: vec![],
        messages: vec![ChatMessage::bot(GREETING)],
        created_at: now.clone(),
        updated_at: now,
        closed_at: None,
        closed_by: None,
        revision: 0,
    }
}

/// Returns a copy of `record` with `message` appended and `updated_at`
/// refreshed.
pub fn append_message(record: &ConversationRecord, message: ChatMessage) -> ConversationRecord {
    append_messages(record, vec![message])
}

/// Returns a copy of `record` with `messages` appended in order and
/// `updated_at` refreshed once.
pub fn append_messages(
    record: &ConversationRecord,
    messages: Vec<ChatMessage>,
) -> ConversationRecord {
    let mut updated = record.clone();
    updated.messages.extend(messages);
    updated.updated_at = now_timestamp();
    updated
}

/// Sets the category (idempotent overwrite) and appends a confirmation
/// message from the bot.
pub fn set_category(record: &ConversationRecord, category: Category) -> ConversationRecord {
    let mut updated = append_message(
        record,
        ChatMessage::bot(format!(
            "You picked: {}. What would you like to know?",
            category.title()
        )),
    );
    updated.category = Some(category);
    updated
}
