// SPDX-FileCopyrightText: 2026 Atelier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation lifecycle, bot chat flow, and query helpers for the Atelier
//! support desk.
//!
//! Pure record transforms live in [`lifecycle`]; [`service`] persists them
//! through the record store and drives the upstream assistant with the
//! fallback-to-human behavior.

pub mod lifecycle;
pub mod prompts;
pub mod query;
pub mod sentiment;
pub mod service;

pub use query::StatusFilter;
pub use sentiment::{SentimentStats, analyze_sentiment, sentiment_stats};
pub use service::{ChatTurn, ConversationService, FALLBACK_REPLY};
