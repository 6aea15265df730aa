// SPDX-FileCopyrightText: 2026 Tallybot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the tallybot keyword counter.
//!
//! This crate provides the error type, the counter domain types, and the
//! [`Messenger`] trait that abstracts the chat platform's profile lookup
//! and push delivery APIs. Everything else in the workspace builds on top
//! of these definitions.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::TallyError;
pub use traits::{Messenger, Profile};
pub use types::{CounterRecord, DateRange, UserTotal};
