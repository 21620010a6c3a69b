// SPDX-FileCopyrightText: 2026 Atelier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Atelier support desk.
//!
//! Provides the domain types, error taxonomy, trait seams, and change-feed
//! events used throughout the workspace.

pub mod error;
pub mod events;
pub mod traits;
pub mod types;

pub use error::AtelierError;
pub use events::{ConversationEvent, EventBus};
pub use traits::{AccountStore, CompletionProvider, ConversationStore};
pub use types::{
    Account, AccountKind, AccountProfile, AgentIdentity, Assignee, AttendanceState, Category,
    ChatMessage, ConversationRecord, ConversationStatus, MessageRole, PromptMessage, PromptRole,
    Sentiment, Transfer, now_timestamp,
};
