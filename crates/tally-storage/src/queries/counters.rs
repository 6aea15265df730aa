// SPDX-FileCopyrightText: 2026 Tallybot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Counter table operations: atomic upsert-increment, ranked totals, and
//! the retention delete.

use chrono::NaiveDate;
use rusqlite::{OptionalExtension, params};
use tally_core::TallyError;

use crate::database::Database;
use crate::models::{CounterRecord, DateRange, UserTotal};

/// Storage format for calendar dates (`%Y-%m-%d` text).
const DATE_FORMAT: &str = "%Y-%m-%d";

fn to_sql_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn parse_sql_date(idx: usize, text: &str) -> Result<NaiveDate, rusqlite::Error> {
    NaiveDate::parse_from_str(text, DATE_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// Record one trigger event for the (user, conversation, date) key.
///
/// Inserts a new row with count = 1, or increments the existing row's count
/// and overwrites its display name with the latest value. The conflict
/// resolution is a single atomic `INSERT ... ON CONFLICT DO UPDATE`, so
/// concurrent increments for the same key can neither duplicate rows nor
/// lose counts.
///
/// The conflict target differs per branch: group rows resolve against the
/// table's UNIQUE constraint, direct-message rows against the partial index
/// on `(user_id, count_date) WHERE group_id IS NULL`.
pub async fn upsert_increment(
    db: &Database,
    user_id: &str,
    group_id: Option<&str>,
    display_name: &str,
    date: NaiveDate,
) -> Result<(), TallyError> {
    let user_id = user_id.to_string();
    let group_id = group_id.map(str::to_string);
    let display_name = display_name.to_string();
    let date = to_sql_date(date);

    db.connection()
        .call(move |conn| {
            match &group_id {
                Some(gid) => {
                    conn.execute(
                        "INSERT INTO keyword_counts (user_id, group_id, display_name, count_date, count)
                         VALUES (?1, ?2, ?3, ?4, 1)
                         ON CONFLICT(user_id, group_id, count_date)
                         DO UPDATE SET count = count + 1, display_name = excluded.display_name",
                        params![user_id, gid, display_name, date],
                    )?;
                }
                None => {
                    conn.execute(
                        "INSERT INTO keyword_counts (user_id, group_id, display_name, count_date, count)
                         VALUES (?1, NULL, ?2, ?3, 1)
                         ON CONFLICT(user_id, count_date) WHERE group_id IS NULL
                         DO UPDATE SET count = count + 1, display_name = excluded.display_name",
                        params![user_id, display_name, date],
                    )?;
                }
            }
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Summed counts per (conversation, user) over an inclusive date range,
/// ordered by total descending.
///
/// Each (group, user) pair appears at most once. Ties between equal totals
/// keep SQLite's scan order, which is unspecified and not relied upon.
pub async fn query_totals(db: &Database, range: DateRange) -> Result<Vec<UserTotal>, TallyError> {
    let start = to_sql_date(range.start);
    let end = to_sql_date(range.end);

    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT group_id, user_id, display_name, SUM(count) AS total
                 FROM keyword_counts
                 WHERE count_date >= ?1 AND count_date <= ?2
                 GROUP BY group_id, user_id
                 ORDER BY total DESC",
            )?;
            let totals = stmt
                .query_map(params![start, end], |row| {
                    Ok(UserTotal {
                        group_id: row.get(0)?,
                        user_id: row.get(1)?,
                        display_name: row.get(2)?,
                        total: row.get(3)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(totals)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Delete all records with a date strictly before `cutoff`.
///
/// Returns the number of rows removed. Idempotent: a second run with the
/// same cutoff removes nothing.
pub async fn delete_older_than(db: &Database, cutoff: NaiveDate) -> Result<usize, TallyError> {
    let cutoff = to_sql_date(cutoff);

    db.connection()
        .call(move |conn| {
            let removed = conn.execute(
                "DELETE FROM keyword_counts WHERE count_date < ?1",
                params![cutoff],
            )?;
            Ok(removed)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Fetch the single record for a (user, conversation, date) key, if any.
pub async fn get_record(
    db: &Database,
    user_id: &str,
    group_id: Option<&str>,
    date: NaiveDate,
) -> Result<Option<CounterRecord>, TallyError> {
    let user_id = user_id.to_string();
    let group_id = group_id.map(str::to_string);
    let date = to_sql_date(date);

    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, group_id, display_name, count_date, count
                 FROM keyword_counts
                 WHERE user_id = ?1
                   AND (group_id = ?2 OR (?2 IS NULL AND group_id IS NULL))
                   AND count_date = ?3",
            )?;
            let record = stmt
                .query_row(params![user_id, group_id, date], |row| {
                    let date_text: String = row.get(4)?;
                    Ok(CounterRecord {
                        id: row.get(0)?,
                        user_id: row.get(1)?,
                        group_id: row.get(2)?,
                        display_name: row.get(3)?,
                        count_date: parse_sql_date(4, &date_text)?,
                        count: row.get(5)?,
                    })
                })
                .optional()?;
            Ok(record)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn three_increments_accumulate_on_one_row() {
        let (db, _dir) = setup_db().await;
        let day = date("2024-01-10");

        for _ in 0..3 {
            upsert_increment(&db, "U1", Some("G1"), "Alice", day)
                .await
                .unwrap();
        }

        let record = get_record(&db, "U1", Some("G1"), day).await.unwrap().unwrap();
        assert_eq!(record.count, 3);
        assert_eq!(record.display_name.as_deref(), Some("Alice"));

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn increment_refreshes_display_name() {
        let (db, _dir) = setup_db().await;
        let day = date("2024-01-10");

        upsert_increment(&db, "U1", Some("G1"), "Old Name", day)
            .await
            .unwrap();
        upsert_increment(&db, "U1", Some("G1"), "New Name", day)
            .await
            .unwrap();

        let record = get_record(&db, "U1", Some("G1"), day).await.unwrap().unwrap();
        assert_eq!(record.count, 2);
        assert_eq!(record.display_name.as_deref(), Some("New Name"));

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn direct_message_key_accumulates_on_one_row() {
        let (db, _dir) = setup_db().await;
        let day = date("2024-01-10");

        // NULL group_id must behave as a distinct, stable key value, not
        // slip past the uniqueness constraint into duplicate rows.
        upsert_increment(&db, "U1", None, "Alice", day).await.unwrap();
        upsert_increment(&db, "U1", None, "Alice", day).await.unwrap();

        let totals = query_totals(&db, DateRange::single_day(day)).await.unwrap();
        assert_eq!(totals.len(), 1);
        assert_eq!(totals[0].total, 2);
        assert!(totals[0].group_id.is_none());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn group_and_direct_keys_are_distinct() {
        let (db, _dir) = setup_db().await;
        let day = date("2024-01-10");

        upsert_increment(&db, "U1", Some("G1"), "Alice", day)
            .await
            .unwrap();
        upsert_increment(&db, "U1", None, "Alice", day).await.unwrap();

        let group_record = get_record(&db, "U1", Some("G1"), day).await.unwrap().unwrap();
        let dm_record = get_record(&db, "U1", None, day).await.unwrap().unwrap();
        assert_eq!(group_record.count, 1);
        assert_eq!(dm_record.count, 1);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn totals_sum_group_and_order_descending() {
        let (db, _dir) = setup_db().await;

        // U1 in G1: 3 over two days. U2 in G1: 1. U3 in G2: 2.
        upsert_increment(&db, "U1", Some("G1"), "Alice", date("2024-01-10"))
            .await
            .unwrap();
        upsert_increment(&db, "U1", Some("G1"), "Alice", date("2024-01-10"))
            .await
            .unwrap();
        upsert_increment(&db, "U1", Some("G1"), "Alice", date("2024-01-11"))
            .await
            .unwrap();
        upsert_increment(&db, "U2", Some("G1"), "Bob", date("2024-01-11"))
            .await
            .unwrap();
        upsert_increment(&db, "U3", Some("G2"), "Carol", date("2024-01-10"))
            .await
            .unwrap();
        upsert_increment(&db, "U3", Some("G2"), "Carol", date("2024-01-11"))
            .await
            .unwrap();

        let range = DateRange {
            start: date("2024-01-10"),
            end: date("2024-01-11"),
        };
        let totals = query_totals(&db, range).await.unwrap();

        assert_eq!(totals.len(), 3);
        // No (group, user) pair appears twice.
        let mut keys: Vec<_> = totals
            .iter()
            .map(|t| (t.group_id.clone(), t.user_id.clone()))
            .collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), 3);
        // Non-increasing totals.
        for pair in totals.windows(2) {
            assert!(pair[0].total >= pair[1].total);
        }
        assert_eq!(totals[0].user_id, "U1");
        assert_eq!(totals[0].total, 3);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn totals_respect_date_range() {
        let (db, _dir) = setup_db().await;

        upsert_increment(&db, "U1", Some("G1"), "Alice", date("2024-01-09"))
            .await
            .unwrap();
        upsert_increment(&db, "U1", Some("G1"), "Alice", date("2024-01-10"))
            .await
            .unwrap();
        upsert_increment(&db, "U1", Some("G1"), "Alice", date("2024-01-11"))
            .await
            .unwrap();

        let totals = query_totals(&db, DateRange::single_day(date("2024-01-10")))
            .await
            .unwrap();
        assert_eq!(totals.len(), 1);
        assert_eq!(totals[0].total, 1);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn totals_on_empty_range_are_empty() {
        let (db, _dir) = setup_db().await;
        let totals = query_totals(&db, DateRange::single_day(date("2024-01-10")))
            .await
            .unwrap();
        assert!(totals.is_empty());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn delete_removes_strictly_older_rows_only() {
        let (db, _dir) = setup_db().await;

        upsert_increment(&db, "U1", Some("G1"), "Alice", date("2024-01-15"))
            .await
            .unwrap();
        upsert_increment(&db, "U1", Some("G1"), "Alice", date("2024-01-16"))
            .await
            .unwrap();
        upsert_increment(&db, "U1", Some("G1"), "Alice", date("2024-01-17"))
            .await
            .unwrap();

        // Cutoff matching the retention scenario: current date 2024-02-15,
        // 30-day horizon -> cutoff 2024-01-16.
        let removed = delete_older_than(&db, date("2024-01-16")).await.unwrap();
        assert_eq!(removed, 1);

        assert!(get_record(&db, "U1", Some("G1"), date("2024-01-15"))
            .await
            .unwrap()
            .is_none());
        assert!(get_record(&db, "U1", Some("G1"), date("2024-01-16"))
            .await
            .unwrap()
            .is_some());
        assert!(get_record(&db, "U1", Some("G1"), date("2024-01-17"))
            .await
            .unwrap()
            .is_some());

        // Re-running with the same cutoff is a no-op.
        let removed_again = delete_older_than(&db, date("2024-01-16")).await.unwrap();
        assert_eq!(removed_again, 0);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn concurrent_increments_for_same_key_all_land() {
        let (db, _dir) = setup_db().await;
        let day = date("2024-01-10");

        let mut handles = Vec::new();
        for _ in 0..10 {
            let db = db.clone();
            handles.push(tokio::spawn(async move {
                upsert_increment(&db, "U1", Some("G1"), "Alice", day).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let record = get_record(&db, "U1", Some("G1"), day).await.unwrap().unwrap();
        assert_eq!(record.count, 10);

        db.close().await.unwrap();
    }
}
