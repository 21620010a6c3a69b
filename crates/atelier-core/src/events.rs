// SPDX-FileCopyrightText: 2026 Atelier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Change-feed events published on every conversation mutation.
//!
//! The attendance queue view subscribes to this feed so claims and closures
//! become visible immediately instead of within a polling window.

use serde::Serialize;
use tokio::sync::broadcast;

use crate::types::MessageRole;

/// A conversation change, broadcast to all subscribers.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConversationEvent {
    Created {
        conversation_id: String,
        owner_id: String,
    },
    MessageAppended {
        conversation_id: String,
        owner_id: String,
        role: MessageRole,
    },
    Claimed {
        conversation_id: String,
        owner_id: String,
        agent_id: String,
        agent_name: String,
    },
    Transferred {
        conversation_id: String,
        owner_id: String,
        from_agent_id: Option<String>,
        to_agent_id: String,
        to_agent_name: String,
    },
    Closed {
        conversation_id: String,
        owner_id: String,
        agent_id: String,
    },
    Deleted {
        conversation_id: String,
        owner_id: String,
    },
}

impl ConversationEvent {
    /// The conversation this event concerns.
    pub fn conversation_id(&self) -> &str {
        match self {
            Self::Created {
                conversation_id, ..
            }
            | Self::MessageAppended {
                conversation_id, ..
            }
            | Self::Claimed {
                conversation_id, ..
            }
            | Self::Transferred {
                conversation_id, ..
            }
            | Self::Closed {
                conversation_id, ..
            }
            | Self::Deleted {
                conversation_id, ..
            } => conversation_id,
        }
    }
}

/// Broadcast bus for [`ConversationEvent`]s.
///
/// Publishing never fails: with no live subscribers the event is dropped,
/// which is the correct behavior for a change feed backed by durable state
/// (late subscribers re-read the store for their initial view).
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ConversationEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn publish(&self, event: ConversationEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ConversationEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_published_events() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();

        bus.publish(ConversationEvent::Claimed {
            conversation_id: "conv-1".into(),
            owner_id: "user-1".into(),
            agent_id: "emp-1".into(),
            agent_name: "Ana".into(),
        });

        let event = rx.recv().await.unwrap();
        assert_eq!(event.conversation_id(), "conv-1");
        match event {
            ConversationEvent::Claimed { agent_name, .. } => assert_eq!(agent_name, "Ana"),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn publish_without_subscribers_is_a_noop() {
        let bus = EventBus::new(8);
        bus.publish(ConversationEvent::Deleted {
            conversation_id: "conv-1".into(),
            owner_id: "user-1".into(),
        });
    }

    #[test]
    fn events_serialize_with_type_tag() {
        let event = ConversationEvent::Closed {
            conversation_id: "conv-1".into(),
            owner_id: "user-1".into(),
            agent_id: "emp-1".into(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"closed""#), "got: {json}");
    }
}
