// SPDX-FileCopyrightText: 2026 Atelier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keyword sentiment tagger.
//!
//! A static substring lookup with no internal state: a message containing
//! only positive keywords tags positive, only negative keywords tags
//! negative, anything else (including both at once) tags neutral.

use atelier_core::types::{ChatMessage, MessageRole, Sentiment};
use serde::Serialize;

const POSITIVE_WORDS: &[&str] = &[
    "thank", "great", "excellent", "good", "perfect", "loved", "helped", "solved", "wonderful",
];

const NEGATIVE_WORDS: &[&str] = &[
    "problem",
    "bad",
    "terrible",
    "horrible",
    "complaint",
    "unsatisfied",
    "doesn't work",
    "defect",
    "delay",
];

/// Tags a message text by keyword lookup over the lowercased input.
pub fn analyze_sentiment(text: &str) -> Sentiment {
    let lower = text.to_lowercase();
    let has_positive = POSITIVE_WORDS.iter().any(|w| lower.contains(w));
    let has_negative = NEGATIVE_WORDS.iter().any(|w| lower.contains(w));

    match (has_positive, has_negative) {
        (true, false) => Sentiment::Positive,
        (false, true) => Sentiment::Negative,
        _ => Sentiment::Neutral,
    }
}

/// Sentiment tally over a conversation's customer messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SentimentStats {
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
    pub total: usize,
}

/// Counts customer messages by sentiment tag. Bot and agent messages are
/// excluded: only the customer's mood is of interest.
pub fn sentiment_stats(messages: &[ChatMessage]) -> SentimentStats {
    let mut stats = SentimentStats {
        positive: 0,
        negative: 0,
        neutral: 0,
        total: 0,
    };
    for msg in messages.iter().filter(|m| m.role == MessageRole::Customer) {
        stats.total += 1;
        match msg.sentiment {
            Sentiment::Positive => stats.positive += 1,
            Sentiment::Negative => stats.negative += 1,
            Sentiment::Neutral => stats.neutral += 1,
        }
    }
    stats
}
