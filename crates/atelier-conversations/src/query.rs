// SPDX-FileCopyrightText: 2026 Atelier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Presentation helpers for conversation lists.
//!
//! Pure functions shared by the customer's own view and the employee queue
//! view.

use atelier_core::types::{AttendanceState, ConversationRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Sentinel preview for conversations without messages.
pub const NO_MESSAGES: &str = "No messages";

/// Queue filter over the derived attendance state.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    Assigned,
    Closed,
}

/// Keeps the records matching `filter`. `All` is the identity.
pub fn filter_by_status(
    records: &[ConversationRecord],
    filter: StatusFilter,
) -> Vec<ConversationRecord> {
    records
        .iter()
        .filter(|record| match filter {
            StatusFilter::All => true,
            StatusFilter::Pending => record.attendance_state() == AttendanceState::Pending,
            StatusFilter::Assigned => record.attendance_state() == AttendanceState::Assigned,
            StatusFilter::Closed => record.attendance_state() == AttendanceState::Closed,
        })
        .cloned()
        .collect()
}

/// Stable sort, most recently updated first.
pub fn sort_by_recency(mut records: Vec<ConversationRecord>) -> Vec<ConversationRecord> {
    // Timestamps share one fixed-width RFC 3339 format, so string order is
    // chronological order.
    records.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    records
}

/// Truncated text of the last message, or the no-messages sentinel.
pub fn last_message_preview(record: &ConversationRecord, max_len: usize) -> String {
    match record.last_message() {
        None => NO_MESSAGES.to_string(),
        Some(msg) => {
            if msg.text.chars().count() > max_len {
                let truncated: String = msg.text.chars().take(max_len).collect();
                format!("{truncated}...")
            } else {
                msg.text.clone()
            }
        }
    }
}

/// Buckets a timestamp's age for human display: "just now", minutes, hours,
/// days, then an absolute `dd/mm` date. Unparsable input is returned as-is.
pub fn relative_timestamp(timestamp: &str, now: DateTime<Utc>) -> String {
    let Ok(parsed) = DateTime::parse_from_rfc3339(timestamp) else {
        return timestamp.to_string();
    };
    let age = now.signed_duration_since(parsed.with_timezone(&Utc));

    let minutes = age.num_minutes();
    if minutes < 1 {
        return "just now".to_string();
    }
    if minutes < 60 {
        return format!("{minutes}m ago");
    }
    let hours = age.num_hours();
    if hours < 24 {
        return format!("{hours}h ago");
    }
    let days = age.num_days();
    if days < 7 {
        return format!("{days}d ago");
    }
    parsed.format("%d/%m").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::{append_message, new_conversation};
    use atelier_core::types::{
        Assignee, ChatMessage, ConversationStatus, Sentiment, now_timestamp,
    };
    use chrono::TimeZone;

    fn pending(id: &str) -> ConversationRecord {
        let mut record = new_conversation("user-1", None);
        record.id = id.to_string();
        record
    }

    fn assigned(id: &str) -> ConversationRecord {
        let mut record = pending(id);
        record.assigned_to = Some(Assignee {
            agent_id: "emp-1".into(),
            agent_name: "Ana".into(),
            assigned_at: now_timestamp(),
        });
        record.status = ConversationStatus::InProgress;
        record
    }

    fn closed(id: &str) -> ConversationRecord {
        let mut record = assigned(id);
        record.status = ConversationStatus::Closed;
        record.closed_at = Some(now_timestamp());
        record.closed_by = Some("emp-1".into());
        record
    }

    #[test]
    fn filters_partition_the_queue() {
        let records = vec![pending("c1"), assigned("c2"), closed("c3"), pending("c4")];

        assert_eq!(filter_by_status(&records, StatusFilter::All).len(), 4);

        let pending_only = filter_by_status(&records, StatusFilter::Pending);
        assert_eq!(
            pending_only.iter().map(|r| r.id.as_str()).collect::<Vec<_>>(),
            vec!["c1", "c4"]
        );

        let assigned_only = filter_by_status(&records, StatusFilter::Assigned);
        assert_eq!(assigned_only.len(), 1);
        assert_eq!(assigned_only[0].id, "c2");

        let closed_only = filter_by_status(&records, StatusFilter::Closed);
        assert_eq!(closed_only.len(), 1);
        assert_eq!(closed_only[0].id, "c3");
    }

    #[test]
    fn sort_puts_most_recent_first() {
        let mut a = pending("a");
        a.updated_at = "2026-03-01T10:00:00.000Z".to_string();
        let mut b = pending("b");
        b.updated_at = "2026-03-01T12:00:00.000Z".to_string();
        let mut c = pending("c");
        c.updated_at = "2026-02-28T09:00:00.000Z".to_string();

        let sorted = sort_by_recency(vec![a, b, c]);
        let ids: Vec<_> = sorted.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[test]
    fn preview_truncates_long_messages() {
        let record = pending("c1");
        let long_text = "x".repeat(80);
        let record = append_message(
            &record,
            ChatMessage::customer(long_text, Sentiment::Neutral),
        );

        let preview = last_message_preview(&record, 50);
        assert_eq!(preview.chars().count(), 53);
        assert!(preview.ends_with("..."));

        let record = append_message(&record, ChatMessage::customer("short", Sentiment::Neutral));
        assert_eq!(last_message_preview(&record, 50), "short");
    }

    #[test]
    fn preview_of_empty_record_is_the_sentinel() {
        let mut record = pending("c1");
        record.messages.clear();
        assert_eq!(last_message_preview(&record, 50), NO_MESSAGES);
    }

    #[test]
    fn relative_timestamp_buckets() {
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap();

        assert_eq!(relative_timestamp("2026-03-10T11:59:40.000Z", now), "just now");
        assert_eq!(relative_timestamp("2026-03-10T11:35:00.000Z", now), "25m ago");
        assert_eq!(relative_timestamp("2026-03-10T07:00:00.000Z", now), "5h ago");
        assert_eq!(relative_timestamp("2026-03-07T12:00:00.000Z", now), "3d ago");
        assert_eq!(relative_timestamp("2026-02-01T12:00:00.000Z", now), "01/02");
        assert_eq!(relative_timestamp("not-a-date", now), "not-a-date");
    }
}
