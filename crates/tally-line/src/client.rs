// SPDX-FileCopyrightText: 2026 Tallybot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! reqwest client for the LINE Messaging API.
//!
//! Covers the three calls the bot needs: direct-message profile lookup,
//! group-member profile lookup, and text push. Every request carries the
//! channel access token and the configured bound timeout, so a hung lookup
//! fails over to the caller's fallback path instead of blocking.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use tally_config::model::LineConfig;
use tally_core::error::TallyError;
use tally_core::traits::{Messenger, Profile};

/// LINE Messaging API client implementing [`Messenger`].
#[derive(Debug, Clone)]
pub struct LineClient {
    http: reqwest::Client,
    api_base: String,
    channel_token: String,
}

impl LineClient {
    /// Creates a new client.
    ///
    /// Requires `config.channel_token` to be set.
    pub fn new(config: &LineConfig) -> Result<Self, TallyError> {
        let token = config.channel_token.as_deref().ok_or_else(|| {
            TallyError::Config("line.channel_token is required for the LINE client".into())
        })?;

        if token.is_empty() {
            return Err(TallyError::Config(
                "line.channel_token cannot be empty".into(),
            ));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| TallyError::Channel {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            channel_token: token.to_string(),
        })
    }

    async fn fetch_profile(&self, url: String) -> Result<Profile, TallyError> {
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.channel_token)
            .send()
            .await
            .map_err(|e| TallyError::Channel {
                message: format!("profile request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(TallyError::Channel {
                message: format!("profile request returned {status}: {detail}"),
                source: None,
            });
        }

        let profile: ProfileResponse =
            response.json().await.map_err(|e| TallyError::Channel {
                message: format!("profile response was not valid JSON: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Profile {
            display_name: profile.display_name,
        })
    }
}

/// Body of the profile endpoints; only the display name is used.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileResponse {
    display_name: String,
}

#[async_trait]
impl Messenger for LineClient {
    async fn user_profile(&self, user_id: &str) -> Result<Profile, TallyError> {
        self.fetch_profile(format!("{}/v2/bot/profile/{user_id}", self.api_base))
            .await
    }

    async fn group_member_profile(
        &self,
        group_id: &str,
        user_id: &str,
    ) -> Result<Profile, TallyError> {
        self.fetch_profile(format!(
            "{}/v2/bot/group/{group_id}/member/{user_id}",
            self.api_base
        ))
        .await
    }

    async fn push_text(&self, to: &str, text: &str) -> Result<(), TallyError> {
        let body = serde_json::json!({
            "to": to,
            "messages": [{ "type": "text", "text": text }],
        });

        let response = self
            .http
            .post(format!("{}/v2/bot/message/push", self.api_base))
            .bearer_auth(&self.channel_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| TallyError::Channel {
                message: format!("push request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            // Keep whatever diagnostic payload the platform returned; it is
            // the only clue when a push is rejected.
            let detail = response.text().await.unwrap_or_default();
            return Err(TallyError::Channel {
                message: format!("push to {to} returned {status}: {detail}"),
                source: None,
            });
        }

        Ok(())
    }
}
