// SPDX-FileCopyrightText: 2026 Atelier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider trait for the upstream chat-completion API.

use async_trait::async_trait;

use crate::error::AtelierError;
use crate::types::PromptMessage;

/// Seam for the external chat-completion collaborator.
///
/// The whole dependency is: send ordered role/content pairs plus a system
/// prompt, receive back a single text reply or a typed error. The bot chat
/// flow is tested against a stub implementation of this trait.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(
        &self,
        system_prompt: &str,
        messages: &[PromptMessage],
    ) -> Result<String, AtelierError>;
}
