// SPDX-FileCopyrightText: 2026 Atelier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pure attendance transitions: pending -> assigned -> closed.
//!
//! Each function returns a new record value or a typed error; nothing is
//! persisted here. Illegal transitions are rejected, never silently
//! applied: claiming an assigned conversation reports who holds it, and a
//! closed conversation accepts no further transitions at all.

use atelier_core::types::{
    Assignee, AttendanceState, ConversationRecord, ConversationStatus, Transfer, now_timestamp,
};
use atelier_core::AtelierError;

/// Claims a pending conversation for `agent_id`.
///
/// Legal only from `pending`. A conversation already held by another agent
/// fails with [`AtelierError::AlreadyAssigned`]; reassignment goes through
/// [`transfer`].
pub fn claim(
    record: &ConversationRecord,
    agent_id: &str,
    agent_name: &str,
) -> Result<ConversationRecord, AtelierError> {
    if record.status == ConversationStatus::Closed {
        return Err(AtelierError::InvalidTransition {
            state: AttendanceState::Closed,
            operation: "claim",
        });
    }
    if let Some(current) = &record.assigned_to {
        return Err(AtelierError::AlreadyAssigned {
            agent_id: current.agent_id.clone(),
            agent_name: current.agent_name.clone(),
        });
    }

    let now = now_timestamp();
    let mut updated = record.clone();
    updated.assigned_to = Some(Assignee {
        agent_id: agent_id.to_string(),
        agent_name: agent_name.to_string(),
        assigned_at: now.clone(),
    });
    updated.status = ConversationStatus::InProgress;
    updated.updated_at = now;
    Ok(updated)
}

/// Hands an assigned conversation over to a different agent, appending to
/// the transfer history.
///
/// Legal only from `assigned`: an unclaimed conversation has no assignee to
/// transfer from and must be claimed first.
pub fn transfer(
    record: &ConversationRecord,
    new_agent_id: &str,
    new_agent_name: &str,
) -> Result<ConversationRecord, AtelierError> {
    if record.status == ConversationStatus::Closed {
        return Err(AtelierError::InvalidTransition {
            state: AttendanceState::Closed,
            operation: "transfer",
        });
    }
    let Some(previous) = record.assigned_to.clone() else {
        return Err(AtelierError::InvalidTransition {
            state: AttendanceState::Pending,
            operation: "transfer",
        });
    };

    let now = now_timestamp();
    let next = Assignee {
        agent_id: new_agent_id.to_string(),
        agent_name: new_agent_name.to_string(),
        assigned_at: now.clone(),
    };
    let mut updated = record.clone();
    updated.transfer_history.push(Transfer {
        from: Some(previous),
        to: next.clone(),
        at: now.clone(),
    });
    updated.assigned_to = Some(next);
    updated.updated_at = now;
    Ok(updated)
}

/// Closes an assigned conversation. Terminal.
///
/// The closer must be the current assignee; anyone else gets
/// [`AtelierError::NotAssignee`]. The legitimate hand-off path for another
/// agent is [`transfer`] followed by `close`.
pub fn close(
    record: &ConversationRecord,
    agent_id: &str,
) -> Result<ConversationRecord, AtelierError> {
    if record.status == ConversationStatus::Closed {
        return Err(AtelierError::InvalidTransition {
            state: AttendanceState::Closed,
            operation: "close",
        });
    }
    let Some(assignee) = &record.assigned_to else {
        return Err(AtelierError::InvalidTransition {
            state: AttendanceState::Pending,
            operation: "close",
        });
    };
    if assignee.agent_id != agent_id {
        return Err(AtelierError::NotAssignee {
            agent_id: agent_id.to_string(),
        });
    }

    let now = now_timestamp();
    let mut updated = record.clone();
    updated.status = ConversationStatus::Closed;
    updated.closed_at = Some(now.clone());
    updated.closed_by = Some(agent_id.to_string());
    updated.updated_at = now;
    Ok(updated)
}
