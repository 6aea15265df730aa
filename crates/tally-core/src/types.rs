// SPDX-FileCopyrightText: 2026 Tallybot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across the tallybot workspace.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Sentinel user identifier recorded when an event carries no sender id.
///
/// A missing id must never fail the batch, so such events are counted
/// under this stable placeholder instead.
pub const UNKNOWN_USER: &str = "unknown_user";

/// One row of the counter table: the number of trigger events observed for
/// a (user, conversation, day) key.
///
/// Exactly one record exists per key; all increments for the key accumulate
/// into `count` on that single row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterRecord {
    /// Surrogate primary key.
    pub id: i64,
    /// Opaque sender identifier.
    pub user_id: String,
    /// Conversation identifier; `None` for direct messages.
    pub group_id: Option<String>,
    /// Display name captured at write time. Not re-resolved, so it may be stale.
    pub display_name: Option<String>,
    /// Calendar date the count applies to (no time component).
    pub count_date: NaiveDate,
    /// Number of trigger events observed for this key on this date.
    pub count: i64,
}

/// One aggregated row from a totals query: the summed count for a
/// (conversation, user) pair over a date range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserTotal {
    /// Conversation identifier; `None` for direct messages.
    pub group_id: Option<String>,
    /// Opaque sender identifier.
    pub user_id: String,
    /// Most recently captured display name, if any.
    pub display_name: Option<String>,
    /// Sum of `count` over the queried range.
    pub total: i64,
}

/// An inclusive calendar date range used as the totals query predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    /// First day of the range, inclusive.
    pub start: NaiveDate,
    /// Last day of the range, inclusive.
    pub end: NaiveDate,
}

impl DateRange {
    /// A range covering exactly one calendar day.
    pub fn single_day(day: NaiveDate) -> Self {
        Self { start: day, end: day }
    }

    /// The `days`-day window ending at `end`, inclusive on both ends.
    ///
    /// `trailing_days(d, 7)` covers `d - 6 ..= d`.
    pub fn trailing_days(end: NaiveDate, days: u64) -> Self {
        let span = days.saturating_sub(1);
        Self {
            start: end - chrono::Days::new(span),
            end,
        }
    }

    /// Whether `day` falls inside this range.
    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn single_day_range_contains_only_that_day() {
        let range = DateRange::single_day(date("2024-01-10"));
        assert!(range.contains(date("2024-01-10")));
        assert!(!range.contains(date("2024-01-09")));
        assert!(!range.contains(date("2024-01-11")));
    }

    #[test]
    fn trailing_seven_days_is_inclusive_on_both_ends() {
        let range = DateRange::trailing_days(date("2024-01-11"), 7);
        assert_eq!(range.start, date("2024-01-05"));
        assert_eq!(range.end, date("2024-01-11"));
        assert!(range.contains(date("2024-01-05")));
        assert!(range.contains(date("2024-01-11")));
        assert!(!range.contains(date("2024-01-04")));
    }

    #[test]
    fn trailing_one_day_is_a_single_day() {
        let range = DateRange::trailing_days(date("2024-01-11"), 1);
        assert_eq!(range, DateRange::single_day(date("2024-01-11")));
    }

    #[test]
    fn counter_record_serializes() {
        let record = CounterRecord {
            id: 1,
            user_id: "U1".into(),
            group_id: Some("G1".into()),
            display_name: Some("Alice".into()),
            count_date: date("2024-01-10"),
            count: 3,
        };
        let json = serde_json::to_string(&record).unwrap();
        let parsed: CounterRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, parsed);
    }
}
