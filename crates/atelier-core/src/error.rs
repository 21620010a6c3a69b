// SPDX-FileCopyrightText: 2026 Atelier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Atelier support desk.

use thiserror::Error;

use crate::types::AttendanceState;

/// The primary error type used across all Atelier crates.
///
/// State-machine failures are ordinary values, not panics: callers receive
/// the reason (who holds the claim, which transition was illegal) and can
/// degrade gracefully.
#[derive(Debug, Error)]
pub enum AtelierError {
    /// Configuration errors (invalid TOML, missing required fields).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A record or account that should exist does not.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A state-machine operation was called from a state that does not permit it.
    #[error("cannot {operation} a {state} conversation")]
    InvalidTransition {
        state: AttendanceState,
        operation: &'static str,
    },

    /// A claim was attempted on a conversation another agent already holds.
    #[error("conversation is already assigned to {agent_name} ({agent_id})")]
    AlreadyAssigned {
        agent_id: String,
        agent_name: String,
    },

    /// The acting agent is not the conversation's current assignee.
    #[error("agent {agent_id} is not the current assignee")]
    NotAssignee { agent_id: String },

    /// An optimistic write lost the race: the stored revision moved on.
    #[error("stale write for conversation {id}: revision changed underneath the writer")]
    Conflict { id: String },

    /// A field-level validation failure, surfaced back to the form that produced it.
    #[error("{field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// The upstream completion API rejected the request (4xx).
    #[error("upstream rejected the request ({status}): {message}")]
    UpstreamRejected { status: u16, message: String },

    /// The upstream completion API could not be reached or failed (5xx, connect, timeout).
    #[error("upstream unavailable: {message}")]
    UpstreamUnavailable {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages_carry_context() {
        let err = AtelierError::AlreadyAssigned {
            agent_id: "emp-1".into(),
            agent_name: "Ana".into(),
        };
        assert_eq!(
            err.to_string(),
            "conversation is already assigned to Ana (emp-1)"
        );

        let err = AtelierError::InvalidTransition {
            state: AttendanceState::Closed,
            operation: "claim",
        };
        assert_eq!(err.to_string(), "cannot claim a closed conversation");

        let err = AtelierError::NotFound {
            entity: "conversation",
            id: "conv-9".into(),
        };
        assert_eq!(err.to_string(), "conversation not found: conv-9");
    }

    #[test]
    fn validation_error_is_field_scoped() {
        let err = AtelierError::Validation {
            field: "email",
            message: "invalid email".into(),
        };
        assert_eq!(err.to_string(), "email: invalid email");
    }
}
