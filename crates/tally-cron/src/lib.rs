// SPDX-FileCopyrightText: 2026 Tallybot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Calendar scheduling for the tallybot keyword counter.
//!
//! [`Scheduler`] runs one tokio task per cron-scheduled job, each with its
//! own error boundary so a failed run cannot affect another job or its own
//! next firing. [`jobs`] builds the three jobs the bot needs: daily
//! ranking, weekly ranking, and the retention sweep.

pub mod jobs;
pub mod scheduler;

pub use jobs::build_scheduler;
pub use scheduler::{JobFn, Scheduler};
