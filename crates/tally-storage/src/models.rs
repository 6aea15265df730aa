// SPDX-FileCopyrightText: 2026 Tallybot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model types for storage entities.
//!
//! The canonical types are defined in `tally-core::types` so the ingest and
//! ranking crates can use them without depending on the storage backend.
//! This module re-exports them for convenience within the storage crate.

pub use tally_core::types::{CounterRecord, DateRange, UserTotal};
