// SPDX-FileCopyrightText: 2026 Tallybot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ranking aggregation and dispatch.
//!
//! The totals query already returns rows grouped per (conversation, user)
//! and ordered by total descending; this module partitions them per
//! conversation, formats the numbered ranking text, and pushes one message
//! per group. Partitioning happens here rather than in SQL so formatting
//! stays independent of the query, and so one failed push cannot take the
//! whole run down with it.

use std::sync::Arc;

use tracing::{debug, error, info};

use tally_core::TallyError;
use tally_core::traits::Messenger;
use tally_core::types::{DateRange, UserTotal};
use tally_storage::Database;
use tally_storage::queries::counters;

/// Computes ranked summaries and pushes them to group conversations.
pub struct Aggregator {
    db: Database,
    messenger: Arc<dyn Messenger>,
}

impl Aggregator {
    pub fn new(db: Database, messenger: Arc<dyn Messenger>) -> Self {
        Self { db, messenger }
    }

    /// Compute the ranking over `range` and push one message per group.
    ///
    /// A store read error aborts the whole run (no partial ranking is
    /// pushed); an empty result pushes nothing. Push failures are logged
    /// per conversation and do not block the remaining conversations.
    pub async fn push_ranking(&self, range: DateRange, title: &str) -> Result<(), TallyError> {
        let totals = counters::query_totals(&self.db, range).await?;

        if totals.is_empty() {
            info!(title = %title, "no records in range, nothing to push");
            return Ok(());
        }

        for (group_id, entries) in partition_by_group(totals) {
            let Some(group_id) = group_id else {
                // Direct-message rows have no conversation to push to.
                debug!("skipping direct-message entries in ranking dispatch");
                continue;
            };

            let text = format_ranking(title, &entries);
            match self.messenger.push_text(&group_id, &text).await {
                Ok(()) => info!(group_id = %group_id, "ranking pushed"),
                Err(e) => error!(group_id = %group_id, error = %e, "ranking push failed"),
            }
        }

        Ok(())
    }
}

/// Split totals into one list per conversation, preserving both the
/// first-seen partition order and the descending-total order within each
/// partition.
fn partition_by_group(totals: Vec<UserTotal>) -> Vec<(Option<String>, Vec<UserTotal>)> {
    let mut partitions: Vec<(Option<String>, Vec<UserTotal>)> = Vec::new();
    for row in totals {
        match partitions.iter().position(|(gid, _)| *gid == row.group_id) {
            Some(i) => partitions[i].1.push(row),
            None => {
                let key = row.group_id.clone();
                partitions.push((key, vec![row]));
            }
        }
    }
    partitions
}

/// Render the numbered ranking lines under `title`.
fn format_ranking(title: &str, entries: &[UserTotal]) -> String {
    let mut text = String::from(title);
    for (i, entry) in entries.iter().enumerate() {
        let name = entry.display_name.as_deref().unwrap_or(&entry.user_id);
        text.push_str(&format!("\n{}. {}: {} times", i + 1, name, entry.total));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tally_storage::queries::counters::upsert_increment;
    use tally_test_utils::MockMessenger;
    use tempfile::tempdir;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn total(group: Option<&str>, user: &str, name: Option<&str>, n: i64) -> UserTotal {
        UserTotal {
            group_id: group.map(str::to_string),
            user_id: user.to_string(),
            display_name: name.map(str::to_string),
            total: n,
        }
    }

    async fn setup() -> (Database, Arc<MockMessenger>, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("ranking.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, Arc::new(MockMessenger::new()), dir)
    }

    #[test]
    fn format_ranking_numbers_entries_and_falls_back_to_user_id() {
        let entries = [
            total(Some("G1"), "U1", Some("Alice"), 5),
            total(Some("G1"), "U2", None, 2),
        ];
        let text = format_ranking("Ranking 2024-01-10", &entries);
        assert_eq!(text, "Ranking 2024-01-10\n1. Alice: 5 times\n2. U2: 2 times");
    }

    #[test]
    fn partition_preserves_order_within_groups() {
        let totals = vec![
            total(Some("G1"), "U1", None, 5),
            total(Some("G2"), "U3", None, 4),
            total(Some("G1"), "U2", None, 3),
            total(None, "U4", None, 2),
        ];
        let partitions = partition_by_group(totals);
        assert_eq!(partitions.len(), 3);
        assert_eq!(partitions[0].0.as_deref(), Some("G1"));
        assert_eq!(partitions[0].1.len(), 2);
        assert_eq!(partitions[0].1[0].user_id, "U1");
        assert_eq!(partitions[0].1[1].user_id, "U2");
        assert_eq!(partitions[1].0.as_deref(), Some("G2"));
        assert!(partitions[2].0.is_none());
    }

    #[tokio::test]
    async fn empty_range_pushes_nothing() {
        let (db, mock, _dir) = setup().await;
        let aggregator = Aggregator::new(db, Arc::clone(&mock) as Arc<dyn Messenger>);

        aggregator
            .push_ranking(DateRange::single_day(date("2024-01-10")), "Ranking")
            .await
            .unwrap();
        assert_eq!(mock.pushed_count().await, 0);
    }

    #[tokio::test]
    async fn one_message_per_group_in_descending_order() {
        let (db, mock, _dir) = setup().await;
        let day = date("2024-01-10");

        for _ in 0..3 {
            upsert_increment(&db, "U1", Some("G1"), "Alice", day).await.unwrap();
        }
        upsert_increment(&db, "U2", Some("G1"), "Bob", day).await.unwrap();
        upsert_increment(&db, "U3", Some("G2"), "Carol", day).await.unwrap();

        let aggregator = Aggregator::new(db, Arc::clone(&mock) as Arc<dyn Messenger>);
        aggregator
            .push_ranking(DateRange::single_day(day), "Ranking 2024-01-10")
            .await
            .unwrap();

        let pushed = mock.pushed_messages().await;
        assert_eq!(pushed.len(), 2);

        let g1 = pushed.iter().find(|(to, _)| to == "G1").unwrap();
        assert_eq!(
            g1.1,
            "Ranking 2024-01-10\n1. Alice: 3 times\n2. Bob: 1 times"
        );
        let g2 = pushed.iter().find(|(to, _)| to == "G2").unwrap();
        assert_eq!(g2.1, "Ranking 2024-01-10\n1. Carol: 1 times");
    }

    #[tokio::test]
    async fn failed_push_does_not_block_other_groups() {
        let (db, mock, _dir) = setup().await;
        let day = date("2024-01-10");

        upsert_increment(&db, "U1", Some("G1"), "Alice", day).await.unwrap();
        upsert_increment(&db, "U2", Some("G2"), "Bob", day).await.unwrap();
        mock.fail_pushes_to("G1").await;

        let aggregator = Aggregator::new(db, Arc::clone(&mock) as Arc<dyn Messenger>);
        aggregator
            .push_ranking(DateRange::single_day(day), "Ranking")
            .await
            .unwrap();

        let pushed = mock.pushed_messages().await;
        assert_eq!(pushed.len(), 1);
        assert_eq!(pushed[0].0, "G2");
    }

    #[tokio::test]
    async fn direct_message_rows_are_not_pushed() {
        let (db, mock, _dir) = setup().await;
        let day = date("2024-01-10");

        upsert_increment(&db, "U1", None, "Alice", day).await.unwrap();

        let aggregator = Aggregator::new(db, Arc::clone(&mock) as Arc<dyn Messenger>);
        aggregator
            .push_ranking(DateRange::single_day(day), "Ranking")
            .await
            .unwrap();
        assert_eq!(mock.pushed_count().await, 0);
    }

    #[tokio::test]
    async fn range_outside_data_pushes_nothing() {
        let (db, mock, _dir) = setup().await;
        upsert_increment(&db, "U1", Some("G1"), "Alice", date("2024-01-10"))
            .await
            .unwrap();

        let aggregator = Aggregator::new(db, Arc::clone(&mock) as Arc<dyn Messenger>);
        aggregator
            .push_ranking(DateRange::single_day(date("2024-01-11")), "Ranking")
            .await
            .unwrap();
        assert_eq!(mock.pushed_count().await, 0);
    }
}
