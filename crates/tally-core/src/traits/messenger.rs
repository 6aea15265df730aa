// SPDX-FileCopyrightText: 2026 Tallybot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Messenger trait for the chat platform's profile and push APIs.

use async_trait::async_trait;

use crate::error::TallyError;

/// A user profile returned by the platform's profile lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    /// Human-readable display name.
    pub display_name: String,
}

/// Outbound side of the chat platform: profile lookups and text pushes.
///
/// Implementations are expected to apply a bounded request timeout so a
/// hung lookup or push fails over instead of blocking the caller.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Look up the profile of a user in a direct-message context.
    async fn user_profile(&self, user_id: &str) -> Result<Profile, TallyError>;

    /// Look up the profile of a group member.
    async fn group_member_profile(
        &self,
        group_id: &str,
        user_id: &str,
    ) -> Result<Profile, TallyError>;

    /// Push a text message to a conversation.
    async fn push_text(&self, to: &str, text: &str) -> Result<(), TallyError>;
}
