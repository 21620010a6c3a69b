// SPDX-FileCopyrightText: 2026 Atelier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Groq chat-completions provider adapter for the Atelier support desk.

pub mod client;
pub mod types;

pub use client::GroqClient;
