// SPDX-FileCopyrightText: 2026 Atelier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the Atelier support desk.
//!
//! Exposes the chat relay (the original external contract: `{messages,
//! systemPrompt}` in, `{content: [{type, text}]}` out), the conversation
//! and attendance REST surface, and an SSE change feed.

pub mod handlers;
pub mod server;
pub mod sse;

pub use server::{GatewayState, router, start_server};
