// SPDX-FileCopyrightText: 2026 Atelier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types for conversations, messages, and accounts.
//!
//! Statuses, roles, and sentiment tags are fixed enumerations so invalid
//! values are caught at construction, not at arbitrary read sites.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Returns the current time as an RFC 3339 UTC timestamp with millisecond
/// precision, the wire and storage format used throughout the workspace.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Persisted status of a conversation record.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ConversationStatus {
    /// Bot conversation, not yet claimed by an agent.
    Active,
    /// Claimed by an agent and being handled.
    InProgress,
    /// Terminal. No further transitions are defined.
    Closed,
}

/// Attendance view of a conversation, derived from status and assignment.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AttendanceState {
    Pending,
    Assigned,
    Closed,
}

/// Topic the customer picked when opening the conversation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Products,
    Orders,
    Complaints,
    Questions,
}

impl Category {
    /// Human-facing title shown in category menus and confirmations.
    pub fn title(self) -> &'static str {
        match self {
            Category::Products => "Products and Apparel",
            Category::Orders => "My Orders",
            Category::Complaints => "Complaints",
            Category::Questions => "General Questions",
        }
    }
}

/// Who authored a chat message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    Customer,
    Bot,
    Agent,
}

/// Keyword-derived sentiment tag attached to each message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

/// The agent currently holding a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignee {
    pub agent_id: String,
    pub agent_name: String,
    pub assigned_at: String,
}

/// Identity stamped on agent-authored messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentIdentity {
    pub agent_id: String,
    pub agent_name: String,
}

/// One hand-off in a conversation's transfer history. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    /// Previous assignee. Always present in records produced by this
    /// implementation; optional because older data may predate the claim
    /// requirement.
    pub from: Option<Assignee>,
    pub to: Assignee,
    pub at: String,
}

/// A single chat message. Messages are append-only and never reordered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub text: String,
    pub timestamp: String,
    pub sentiment: Sentiment,
    /// Set only when `role` is [`MessageRole::Agent`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<AgentIdentity>,
}

impl ChatMessage {
    /// A customer message carrying its sentiment tag.
    pub fn customer(text: impl Into<String>, sentiment: Sentiment) -> Self {
        Self {
            role: MessageRole::Customer,
            text: text.into(),
            timestamp: now_timestamp(),
            sentiment,
            sender: None,
        }
    }

    /// A bot (assistant) message. Bot output is not sentiment-scored.
    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Bot,
            text: text.into(),
            timestamp: now_timestamp(),
            sentiment: Sentiment::Neutral,
            sender: None,
        }
    }

    /// An agent reply, stamped with the sending agent's identity.
    pub fn agent(text: impl Into<String>, sender: AgentIdentity) -> Self {
        Self {
            role: MessageRole::Agent,
            text: text.into(),
            timestamp: now_timestamp(),
            sentiment: Sentiment::Neutral,
            sender: Some(sender),
        }
    }
}

/// The persisted unit representing one customer's support thread, bot and
/// human messages together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationRecord {
    /// Opaque unique identifier, assigned at creation. Immutable.
    pub id: String,
    /// Owning customer. Immutable; the storage partition key.
    pub owner_id: String,
    pub category: Option<Category>,
    pub status: ConversationStatus,
    pub assigned_to: Option<Assignee>,
    #[serde(default)]
    pub transfer_history: Vec<Transfer>,
    pub messages: Vec<ChatMessage>,
    pub created_at: String,
    pub updated_at: String,
    pub closed_at: Option<String>,
    pub closed_by: Option<String>,
    /// Optimistic-concurrency token. Bumped by the store on every persisted
    /// mutation; stale writers are rejected with `Conflict`.
    #[serde(default)]
    pub revision: u64,
}

impl ConversationRecord {
    /// Derives the attendance-queue state from status and assignment.
    pub fn attendance_state(&self) -> AttendanceState {
        match self.status {
            ConversationStatus::Closed => AttendanceState::Closed,
            _ if self.assigned_to.is_some() => AttendanceState::Assigned,
            _ => AttendanceState::Pending,
        }
    }

    /// The most recent message, if any.
    pub fn last_message(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }
}

/// Whether an account belongs to a customer or an employee.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    Customer,
    Employee,
}

/// A stored account. The password is kept only as an argon2id PHC hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub kind: AccountKind,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password_hash: String,
    pub created_at: String,
}

impl Account {
    /// The public view of this account, without the password hash.
    pub fn profile(&self) -> AccountProfile {
        AccountProfile {
            id: self.id.clone(),
            kind: self.kind,
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            created_at: self.created_at.clone(),
        }
    }
}

/// Public account profile, safe to return to clients and to persist as the
/// "currently logged in" record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountProfile {
    pub id: String,
    pub kind: AccountKind,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub created_at: String,
}

/// Role of a message forwarded to the upstream completion API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptRole {
    User,
    Assistant,
}

/// One ordered role/content pair sent to the upstream completion API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: PromptRole,
    pub content: String,
}

impl PromptMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: PromptRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: PromptRole::Assistant,
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&ConversationStatus::InProgress).unwrap();
        assert_eq!(json, r#""in_progress""#);
        let back: ConversationStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ConversationStatus::InProgress);
    }

    #[test]
    fn status_display_and_fromstr_roundtrip() {
        for status in [
            ConversationStatus::Active,
            ConversationStatus::InProgress,
            ConversationStatus::Closed,
        ] {
            let s = status.to_string();
            assert_eq!(ConversationStatus::from_str(&s).unwrap(), status);
        }
    }

    #[test]
    fn attendance_state_derivation() {
        let mut record = ConversationRecord {
            id: "conv-1".into(),
            owner_id: "user-1".into(),
            category: None,
            status: ConversationStatus::Active,
            assigned_to: None,
            transfer_history: vec![],
            messages: vec![],
            created_at: now_timestamp(),
            updated_at: now_timestamp(),
            closed_at: None,
            closed_by: None,
            revision: 0,
        };
        assert_eq!(record.attendance_state(), AttendanceState::Pending);

        record.assigned_to = Some(Assignee {
            agent_id: "emp-1".into(),
            agent_name: "Ana".into(),
            assigned_at: now_timestamp(),
        });
        record.status = ConversationStatus::InProgress;
        assert_eq!(record.attendance_state(), AttendanceState::Assigned);

        record.status = ConversationStatus::Closed;
        assert_eq!(record.attendance_state(), AttendanceState::Closed);
    }

    #[test]
    fn agent_message_carries_sender_identity() {
        let msg = ChatMessage::agent(
            "On it.",
            AgentIdentity {
                agent_id: "emp-1".into(),
                agent_name: "Ana".into(),
            },
        );
        assert_eq!(msg.role, MessageRole::Agent);
        assert_eq!(msg.sender.as_ref().unwrap().agent_name, "Ana");

        let customer = ChatMessage::customer("hi", Sentiment::Neutral);
        assert!(customer.sender.is_none());
        // sender is omitted entirely from customer message JSON.
        let json = serde_json::to_string(&customer).unwrap();
        assert!(!json.contains("sender"));
    }

    #[test]
    fn profile_drops_password_hash() {
        let account = Account {
            id: "1".into(),
            kind: AccountKind::Customer,
            name: "Joan".into(),
            email: "joan@example.com".into(),
            phone: Some("+1 555 0100".into()),
            password_hash: "$argon2id$...".into(),
            created_at: now_timestamp(),
        };
        let profile = account.profile();
        let json = serde_json::to_string(&profile).unwrap();
        assert!(!json.contains("argon2id"));
        assert!(json.contains("joan@example.com"));
    }

    #[test]
    fn now_timestamp_is_rfc3339_utc_millis() {
        let ts = now_timestamp();
        assert!(ts.ends_with('Z'), "expected UTC zulu suffix: {ts}");
        chrono::DateTime::parse_from_rfc3339(&ts).expect("should parse back");
    }
}
