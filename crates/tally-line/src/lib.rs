// SPDX-FileCopyrightText: 2026 Tallybot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! LINE Messaging API collaborator for tallybot.
//!
//! Provides the typed webhook payload (tagged event variants validated at
//! the boundary), `X-Line-Signature` verification, and [`LineClient`], the
//! reqwest-backed [`tally_core::Messenger`] implementation used for profile
//! lookups and ranking pushes.

pub mod client;
pub mod events;
pub mod signature;

pub use client::LineClient;
pub use events::{EventSource, MessageContent, SourceType, WebhookEvent, WebhookPayload};
