// SPDX-FileCopyrightText: 2026 Tallybot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The three scheduled jobs: daily ranking, weekly ranking, retention sweep.
//!
//! Window arithmetic lives in small pure helpers; the job closures only
//! resolve "today" at fire time and delegate to the aggregator or the
//! retention delete.

use std::sync::Arc;

use chrono::{Days, Local, NaiveDate};
use tracing::info;

use tally_agent::Aggregator;
use tally_config::model::ScheduleConfig;
use tally_core::TallyError;
use tally_core::types::DateRange;
use tally_storage::Database;
use tally_storage::queries::counters;

use crate::scheduler::{JobFn, Scheduler};

/// The day the daily ranking covers: exactly the previous calendar day.
fn previous_day(today: NaiveDate) -> NaiveDate {
    today - Days::new(1)
}

/// The weekly ranking window: `window_days` days ending yesterday,
/// inclusive on both ends.
fn weekly_window(today: NaiveDate, window_days: u64) -> DateRange {
    DateRange::trailing_days(previous_day(today), window_days)
}

/// The retention cutoff: records dated strictly before it are purged.
fn retention_cutoff(today: NaiveDate, retention_days: u64) -> NaiveDate {
    today - Days::new(retention_days)
}

/// Daily ranking over yesterday; the title carries the date.
pub fn daily_ranking_job(aggregator: Arc<Aggregator>, keyword: String) -> JobFn {
    Arc::new(move || {
        let aggregator = Arc::clone(&aggregator);
        let keyword = keyword.clone();
        Box::pin(async move {
            let day = previous_day(Local::now().date_naive());
            let title = format!("{keyword} ranking {day}");
            aggregator
                .push_ranking(DateRange::single_day(day), &title)
                .await
        })
    })
}

/// Weekly ranking over the trailing window ending yesterday.
pub fn weekly_ranking_job(
    aggregator: Arc<Aggregator>,
    keyword: String,
    window_days: u64,
) -> JobFn {
    Arc::new(move || {
        let aggregator = Arc::clone(&aggregator);
        let keyword = keyword.clone();
        Box::pin(async move {
            let range = weekly_window(Local::now().date_naive(), window_days);
            let title = format!("{keyword} {window_days}-day ranking");
            aggregator.push_ranking(range, &title).await
        })
    })
}

/// Retention sweep deleting rows older than the horizon.
pub fn retention_job(db: Database, retention_days: u64) -> JobFn {
    Arc::new(move || {
        let db = db.clone();
        Box::pin(async move {
            let cutoff = retention_cutoff(Local::now().date_naive(), retention_days);
            let removed = counters::delete_older_than(&db, cutoff).await?;
            info!(cutoff = %cutoff, removed, "retention sweep complete");
            Ok(())
        })
    })
}

/// Build a scheduler with the three jobs wired to the configured cron
/// expressions.
pub fn build_scheduler(
    config: &ScheduleConfig,
    db: Database,
    aggregator: Arc<Aggregator>,
    keyword: &str,
) -> Result<Scheduler, TallyError> {
    let mut scheduler = Scheduler::new();
    scheduler.add_job(
        "daily-ranking",
        &config.daily_cron,
        daily_ranking_job(Arc::clone(&aggregator), keyword.to_string()),
    )?;
    scheduler.add_job(
        "weekly-ranking",
        &config.weekly_cron,
        weekly_ranking_job(aggregator, keyword.to_string(), config.window_days),
    )?;
    scheduler.add_job(
        "retention-sweep",
        &config.retention_cron,
        retention_job(db, config.retention_days),
    )?;
    Ok(scheduler)
}
