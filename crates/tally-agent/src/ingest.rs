// SPDX-FileCopyrightText: 2026 Tallybot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook event ingestion.
//!
//! A batch is processed sequentially in arrival order. Each event is an
//! independent unit of work: a profile lookup falls back to the user id, a
//! store failure is logged, and neither stops the remaining events. The
//! batch itself never fails.

use std::sync::Arc;

use chrono::Local;
use tracing::{debug, error, warn};

use tally_core::TallyError;
use tally_core::traits::Messenger;
use tally_core::types::UNKNOWN_USER;
use tally_line::events::{EventSource, MessageContent, SourceType, WebhookEvent};
use tally_storage::Database;
use tally_storage::queries::counters;

/// Counts trigger-keyword occurrences from inbound webhook events.
pub struct Ingestor {
    db: Database,
    messenger: Arc<dyn Messenger>,
    keyword: String,
}

impl Ingestor {
    /// Create an ingestor counting occurrences of `keyword`.
    pub fn new(db: Database, messenger: Arc<dyn Messenger>, keyword: impl Into<String>) -> Self {
        Self {
            db,
            messenger,
            keyword: keyword.into(),
        }
    }

    /// Process a webhook batch, attempting every event.
    ///
    /// Returns the number of increments recorded, for logging. Individual
    /// event failures are logged here and never propagate.
    pub async fn process_batch(&self, events: &[WebhookEvent]) -> usize {
        let mut recorded = 0;
        for event in events {
            match self.process_event(event).await {
                Ok(true) => recorded += 1,
                Ok(false) => {}
                Err(e) => error!(error = %e, "failed to record trigger event"),
            }
        }
        recorded
    }

    /// Handle one event. `Ok(true)` means an increment was recorded.
    async fn process_event(&self, event: &WebhookEvent) -> Result<bool, TallyError> {
        let WebhookEvent::Message { message, source } = event else {
            return Ok(false);
        };
        let MessageContent::Text { text } = message else {
            return Ok(false);
        };
        if !text.contains(&self.keyword) {
            return Ok(false);
        }

        let user_id = source
            .user_id
            .clone()
            .unwrap_or_else(|| UNKNOWN_USER.to_string());
        // Only group sources key on a conversation; everything else is a
        // direct-message row.
        let group_id = match source.source_type {
            SourceType::Group => source.group_id.clone(),
            _ => None,
        };

        let display_name = self.resolve_display_name(source, &user_id).await;
        // Counts attach to the process-local calendar date, not the event
        // timestamp.
        let today = Local::now().date_naive();

        counters::upsert_increment(&self.db, &user_id, group_id.as_deref(), &display_name, today)
            .await?;
        debug!(
            user_id = %user_id,
            group_id = ?group_id,
            display_name = %display_name,
            "trigger event recorded"
        );
        Ok(true)
    }

    /// Best-effort display name resolution; never fails the event.
    async fn resolve_display_name(&self, source: &EventSource, user_id: &str) -> String {
        let lookup = match (&source.source_type, source.group_id.as_deref()) {
            (SourceType::User, _) => self.messenger.user_profile(user_id).await,
            (SourceType::Group, Some(group_id)) => {
                self.messenger.group_member_profile(group_id, user_id).await
            }
            // Rooms and unknown sources have no profile endpoint wired up.
            _ => return user_id.to_string(),
        };

        match lookup {
            Ok(profile) => profile.display_name,
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "profile lookup failed, using user id");
                user_id.to_string()
            }
        }
    }
}
