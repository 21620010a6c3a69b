// SPDX-FileCopyrightText: 2026 Atelier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Groq chat-completions API.
//!
//! One request, no retry; the request timeout bounds how long a hung
//! upstream can block a conversation. Failures map to the typed upstream
//! errors so callers can tell a rejected credential from an unreachable
//! service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use tracing::debug;

use atelier_config::UpstreamConfig;
use atelier_core::types::{PromptMessage, PromptRole};
use atelier_core::{AtelierError, CompletionProvider};

use crate::types::{ApiErrorResponse, ApiMessage, ChatCompletionRequest, ChatCompletionResponse};

/// HTTP client for Groq API communication.
#[derive(Debug, Clone)]
pub struct GroqClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl GroqClient {
    /// Creates a client from the upstream configuration.
    ///
    /// Fails with a config error when no API key is set: the desk cannot
    /// serve chat without its upstream credential.
    pub fn new(config: &UpstreamConfig) -> Result<Self, AtelierError> {
        let api_key = config.api_key.as_deref().ok_or_else(|| {
            AtelierError::Config(
                "upstream.api_key is required (set ATELIER_UPSTREAM_API_KEY)".to_string(),
            )
        })?;

        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|e| AtelierError::Config(format!("invalid API key header value: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AtelierError::UpstreamUnavailable {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    /// Overrides the base URL (for testing with wiremock).
    #[cfg(test)]
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }

    /// Sends one completion request and returns the assistant's text.
    pub async fn complete_chat(
        &self,
        system_prompt: &str,
        messages: &[PromptMessage],
    ) -> Result<String, AtelierError> {
        let mut api_messages = Vec::with_capacity(messages.len() + 1);
        api_messages.push(ApiMessage {
            role: "system".to_string(),
            content: system_prompt.to_string(),
        });
        api_messages.extend(messages.iter().map(|msg| ApiMessage {
            role: match msg.role {
                PromptRole::User => "user".to_string(),
                PromptRole::Assistant => "assistant".to_string(),
            },
            content: msg.content.clone(),
        }));

        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: api_messages,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(&self.base_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| AtelierError::UpstreamUnavailable {
                message: format!("could not reach the completion API: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(status = %status, "completion response received");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<ApiErrorResponse>(&body) {
                Ok(api_err) => api_err.error.message,
                Err(_) => body,
            };
            if status.is_server_error() {
                return Err(AtelierError::UpstreamUnavailable {
                    message: format!("completion API returned {status}: {message}"),
                    source: None,
                });
            }
            return Err(AtelierError::UpstreamRejected {
                status: status.as_u16(),
                message,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| AtelierError::UpstreamUnavailable {
                message: format!("failed to read response body: {e}"),
                source: Some(Box::new(e)),
            })?;
        let parsed: ChatCompletionResponse =
            serde_json::from_str(&body).map_err(|e| AtelierError::UpstreamUnavailable {
                message: format!("malformed completion response: {e}"),
                source: Some(Box::new(e)),
            })?;

        if let Some(usage) = parsed.usage {
            debug!(total_tokens = usage.total_tokens, "completion usage");
        }

        let text = parsed
            .choices
            .first()
            .map(|choice| choice.message.content.clone())
            .unwrap_or_default();
        if text.is_empty() {
            return Err(AtelierError::UpstreamUnavailable {
                message: "completion API returned an empty reply".to_string(),
                source: None,
            });
        }
        Ok(text)
    }
}

#[async_trait]
impl CompletionProvider for GroqClient {
    async fn complete(
        &self,
        system_prompt: &str,
        messages: &[PromptMessage],
    ) -> Result<String, AtelierError> {
        self.complete_chat(system_prompt, messages).await
    }
}
