// SPDX-FileCopyrightText: 2026 Tallybot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cron-driven job scheduler.
//!
//! Jobs are independent timers in the same process: each gets its own
//! spawned task that repeatedly computes the next occurrence of its cron
//! expression in local time, sleeps until then, and runs the job. There is
//! no queueing and no catch-up: a fire time that passes while the job body
//! is still running (or while the process is down) is simply skipped.

use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use croner::Cron;
use futures::future::BoxFuture;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use tally_core::TallyError;

/// An async job body. Errors are caught and logged by the job loop.
pub type JobFn = Arc<dyn Fn() -> BoxFuture<'static, Result<(), TallyError>> + Send + Sync>;

struct Job {
    name: String,
    schedule: Cron,
    run: JobFn,
}

/// Owns a set of cron jobs and the cancellation token that stops them.
pub struct Scheduler {
    jobs: Vec<Job>,
    cancel: CancellationToken,
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            jobs: Vec::new(),
            cancel: CancellationToken::new(),
        }
    }

    /// Register a job under a five-field cron `pattern` (local time).
    ///
    /// Fails fast at startup on an invalid pattern.
    pub fn add_job(&mut self, name: &str, pattern: &str, run: JobFn) -> Result<(), TallyError> {
        let schedule: Cron = pattern.parse().map_err(|e| {
            TallyError::Config(format!("invalid cron pattern `{pattern}` for job {name}: {e}"))
        })?;
        self.jobs.push(Job {
            name: name.to_string(),
            schedule,
            run,
        });
        Ok(())
    }

    /// Number of registered jobs.
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Token that stops every job loop when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Spawn one task per registered job and return their handles.
    pub fn spawn(self) -> Vec<JoinHandle<()>> {
        let cancel = self.cancel;
        self.jobs
            .into_iter()
            .map(|job| {
                let cancel = cancel.clone();
                tokio::spawn(run_job_loop(job, cancel))
            })
            .collect()
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

async fn run_job_loop(job: Job, cancel: CancellationToken) {
    info!(job = %job.name, "job scheduled");
    loop {
        let now = Local::now();
        let next = match job.schedule.find_next_occurrence(&now, false) {
            Ok(next) => next,
            Err(e) => {
                error!(job = %job.name, error = %e, "no next occurrence, stopping job loop");
                return;
            }
        };
        let wait = (next - now).to_std().unwrap_or(Duration::ZERO);
        debug!(job = %job.name, next = %next, "sleeping until next fire");

        tokio::select! {
            () = cancel.cancelled() => {
                info!(job = %job.name, "job loop stopped");
                return;
            }
            () = tokio::time::sleep(wait) => {}
        }

        // Each run is its own error boundary: a failure is logged and the
        // loop goes straight back to computing the next occurrence.
        if let Err(e) = (job.run)().await {
            error!(job = %job.name, error = %e, "scheduled job failed");
        }
    }
}
