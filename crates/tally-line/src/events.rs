// SPDX-FileCopyrightText: 2026 Tallybot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed LINE webhook payload.
//!
//! Events arrive as a JSON batch; only text messages matter to the counter,
//! so every other event `type` (and every non-text message `type`)
//! deserializes into a catch-all variant that the ingestor skips. Unknown
//! shapes are tolerated at the boundary rather than failing the batch.

use serde::Deserialize;

/// Request body of `POST /webhook`: a batch of events.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookPayload {
    /// Events in arrival order. LINE may deliver an empty batch as a
    /// connectivity check.
    #[serde(default)]
    pub events: Vec<WebhookEvent>,
}

/// One inbound event, discriminated by its `type` field.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum WebhookEvent {
    /// A message event; the payload nests the actual message content.
    #[serde(rename = "message")]
    Message {
        message: MessageContent,
        source: EventSource,
    },
    /// Any other event type (follow, join, postback, ...). Skipped.
    #[serde(other)]
    Other,
}

/// Message content, discriminated by its `type` field.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum MessageContent {
    /// A text message.
    #[serde(rename = "text")]
    Text { text: String },
    /// Stickers, images, and anything else text-free. Skipped.
    #[serde(other)]
    Other,
}

/// Where an event came from.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSource {
    /// Conversation kind.
    #[serde(rename = "type")]
    pub source_type: SourceType,
    /// Sender identifier. Absent for some group events.
    #[serde(default)]
    pub user_id: Option<String>,
    /// Group identifier; only present for group sources.
    #[serde(default)]
    pub group_id: Option<String>,
}

/// Conversation kind of an event source.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    /// Direct message from a user.
    User,
    /// Group chat.
    Group,
    /// Multi-person room (treated like a direct message for counting:
    /// there is no group id to key or push on).
    Room,
    /// Forward-compatible catch-all for source kinds added later.
    #[serde(untagged)]
    Unknown(String),
}
