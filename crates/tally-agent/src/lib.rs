// SPDX-FileCopyrightText: 2026 Tallybot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Event ingestion and ranking aggregation.
//!
//! [`Ingestor`] turns qualifying webhook events into counter increments;
//! [`Aggregator`] turns stored counts into per-conversation ranking pushes.
//! Both take the database handle and the [`tally_core::Messenger`] at
//! construction; there is no ambient shared state.

pub mod ingest;
pub mod ranking;
pub mod shutdown;

pub use ingest::Ingestor;
pub use ranking::Aggregator;
