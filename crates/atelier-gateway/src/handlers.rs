// SPDX-FileCopyrightText: 2026 Atelier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway REST API.
//!
//! State-machine failures come back as structured `{error, details}` bodies
//! with conflict status codes, so a UI can show "already claimed by X"
//! instead of crashing.

use std::str::FromStr;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use atelier_auth::NewAccount;
use atelier_conversations::StatusFilter;
use atelier_core::types::{Category, ConversationRecord, PromptMessage};
use atelier_core::AtelierError;

use crate::server::GatewayState;

/// Error response body, matching the relay contract.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Maps a domain error onto an HTTP response.
pub(crate) fn error_response(err: AtelierError) -> Response {
    let (status, error, details) = match &err {
        AtelierError::NotFound { .. } => (StatusCode::NOT_FOUND, err.to_string(), None),
        AtelierError::Validation { .. } => (StatusCode::BAD_REQUEST, err.to_string(), None),
        AtelierError::InvalidTransition { .. }
        | AtelierError::AlreadyAssigned { .. }
        | AtelierError::NotAssignee { .. }
        | AtelierError::Conflict { .. } => (StatusCode::CONFLICT, err.to_string(), None),
        AtelierError::UpstreamRejected { status, message } => {
            let (code, label) = match status {
                401 => (StatusCode::UNAUTHORIZED, "Invalid API key"),
                429 => (StatusCode::TOO_MANY_REQUESTS, "Rate limit exceeded"),
                _ => (StatusCode::BAD_GATEWAY, "Upstream rejected the request"),
            };
            (code, label.to_string(), Some(message.clone()))
        }
        AtelierError::UpstreamUnavailable { message, .. } => (
            StatusCode::SERVICE_UNAVAILABLE,
            "Connection error".to_string(),
            Some(message.clone()),
        ),
        AtelierError::Config(_) | AtelierError::Storage { .. } | AtelierError::Internal(_) => {
            tracing::error!(error = %err, "internal error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
                None,
            )
        }
    };
    (status, Json(ErrorBody { error, details })).into_response()
}

fn bad_request(error: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody {
            error: error.to_string(),
            details: None,
        }),
    )
        .into_response()
}

// --- Health ---

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// GET /health
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.started_at.elapsed().as_secs(),
    })
}

// --- Chat relay ---

/// Request body for POST /api/chat. Fields are optional so shape errors
/// yield the contract's 400 body instead of a generic rejection.
#[derive(Debug, Deserialize)]
pub struct RelayRequest {
    #[serde(default)]
    pub messages: Option<Vec<RelayMessage>>,
    #[serde(rename = "systemPrompt", default)]
    pub system_prompt: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RelayMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct RelayResponse {
    pub content: Vec<RelayContent>,
}

#[derive(Debug, Serialize)]
pub struct RelayContent {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
}

/// POST /api/chat
///
/// The stateless relay: forwards ordered role/content pairs plus a system
/// prompt to the upstream completion API and returns the single text reply.
pub async fn post_chat(
    State(state): State<GatewayState>,
    Json(body): Json<RelayRequest>,
) -> Response {
    let Some(messages) = body.messages else {
        return bad_request("invalid format: messages must be an array");
    };
    let Some(system_prompt) = body.system_prompt else {
        return bad_request("systemPrompt is required");
    };

    let history: Vec<PromptMessage> = messages
        .into_iter()
        .map(|msg| {
            if msg.role == "assistant" {
                PromptMessage::assistant(msg.content)
            } else {
                PromptMessage::user(msg.content)
            }
        })
        .collect();

    match state.provider.complete(&system_prompt, &history).await {
        Ok(text) => Json(RelayResponse {
            content: vec![RelayContent {
                kind: "text".to_string(),
                text,
            }],
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

// --- Auth ---

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /api/auth/register
pub async fn post_register(
    State(state): State<GatewayState>,
    Json(body): Json<NewAccount>,
) -> Response {
    match state.auth.register(body).await {
        Ok(profile) => (StatusCode::CREATED, Json(profile)).into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /api/auth/login
pub async fn post_login(
    State(state): State<GatewayState>,
    Json(body): Json<LoginRequest>,
) -> Response {
    match state.auth.login(&body.email, &body.password).await {
        Ok(profile) => Json(profile).into_response(),
        Err(e) => error_response(e),
    }
}

// --- Conversations (customer side) ---

#[derive(Debug, Deserialize)]
pub struct CreateConversationRequest {
    pub owner_id: String,
    #[serde(default)]
    pub category: Option<Category>,
}

#[derive(Debug, Deserialize)]
pub struct OwnerQuery {
    pub owner_id: String,
}

#[derive(Debug, Serialize)]
pub struct ConversationListResponse {
    pub conversations: Vec<ConversationRecord>,
}

#[derive(Debug, Deserialize)]
pub struct CustomerMessageRequest {
    pub owner_id: String,
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct SelectCategoryRequest {
    pub owner_id: String,
    pub category: Category,
}

/// POST /api/conversations
pub async fn post_conversation(
    State(state): State<GatewayState>,
    Json(body): Json<CreateConversationRequest>,
) -> Response {
    match state
        .conversations
        .create(&body.owner_id, body.category)
        .await
    {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(e) => error_response(e),
    }
}

/// GET /api/conversations?owner_id=
pub async fn get_conversations(
    State(state): State<GatewayState>,
    Query(query): Query<OwnerQuery>,
) -> Response {
    match state.conversations.list(&query.owner_id).await {
        Ok(conversations) => Json(ConversationListResponse { conversations }).into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /api/conversations/{id}/messages
///
/// One customer chat turn: the reply is the bot answer, or the fallback
/// hand-off offer when the upstream is down.
pub async fn post_customer_message(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
    Json(body): Json<CustomerMessageRequest>,
) -> Response {
    match state
        .conversations
        .chat_turn(&body.owner_id, &id, &body.text)
        .await
    {
        Ok(turn) => Json(turn).into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /api/conversations/{id}/category
pub async fn post_category(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
    Json(body): Json<SelectCategoryRequest>,
) -> Response {
    match state
        .conversations
        .select_category(&body.owner_id, &id, body.category)
        .await
    {
        Ok(record) => Json(record).into_response(),
        Err(e) => error_response(e),
    }
}

/// DELETE /api/conversations/{id}?owner_id=
pub async fn delete_conversation(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
    Query(query): Query<OwnerQuery>,
) -> Response {
    match state.conversations.delete(&query.owner_id, &id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e),
    }
}

// --- Attendance (employee side) ---

#[derive(Debug, Deserialize)]
pub struct QueueQuery {
    #[serde(default)]
    pub status: Option<String>,
    /// When set, returns only that employee's open assignments.
    #[serde(default)]
    pub employee_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    #[serde(default)]
    pub employee_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AgentRequest {
    pub agent_id: String,
    pub agent_name: String,
}

#[derive(Debug, Deserialize)]
pub struct CloseRequest {
    pub agent_id: String,
}

#[derive(Debug, Deserialize)]
pub struct AgentMessageRequest {
    pub agent_id: String,
    pub agent_name: String,
    pub text: String,
}

/// GET /api/attendance/queue?status=&employee_id=
pub async fn get_queue(
    State(state): State<GatewayState>,
    Query(query): Query<QueueQuery>,
) -> Response {
    if let Some(employee_id) = query.employee_id.as_deref() {
        return match state.attendance.conversations_for_employee(employee_id).await {
            Ok(conversations) => Json(ConversationListResponse { conversations }).into_response(),
            Err(e) => error_response(e),
        };
    }

    let filter = match query.status.as_deref() {
        None => StatusFilter::All,
        Some(raw) => match StatusFilter::from_str(raw) {
            Ok(filter) => filter,
            Err(_) => {
                return bad_request("status must be one of all, pending, assigned, closed");
            }
        },
    };
    match state.attendance.queue(filter).await {
        Ok(conversations) => Json(ConversationListResponse { conversations }).into_response(),
        Err(e) => error_response(e),
    }
}

/// GET /api/attendance/stats?employee_id=
pub async fn get_stats(
    State(state): State<GatewayState>,
    Query(query): Query<StatsQuery>,
) -> Response {
    match state.attendance.stats(query.employee_id.as_deref()).await {
        Ok(stats) => Json(stats).into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /api/attendance/{id}/claim
pub async fn post_claim(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
    Json(body): Json<AgentRequest>,
) -> Response {
    match state
        .attendance
        .claim(&id, &body.agent_id, &body.agent_name)
        .await
    {
        Ok(record) => Json(record).into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /api/attendance/{id}/transfer
pub async fn post_transfer(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
    Json(body): Json<AgentRequest>,
) -> Response {
    match state
        .attendance
        .transfer(&id, &body.agent_id, &body.agent_name)
        .await
    {
        Ok(record) => Json(record).into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /api/attendance/{id}/close
pub async fn post_close(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
    Json(body): Json<CloseRequest>,
) -> Response {
    match state.attendance.close(&id, &body.agent_id).await {
        Ok(record) => Json(record).into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /api/attendance/{id}/messages
pub async fn post_agent_message(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
    Json(body): Json<AgentMessageRequest>,
) -> Response {
    match state
        .attendance
        .reply(&id, &body.agent_id, &body.agent_name, &body.text)
        .await
    {
        Ok(record) => Json(record).into_response(),
        Err(e) => error_response(e),
    }
}
