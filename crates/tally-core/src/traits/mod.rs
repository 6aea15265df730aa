// SPDX-FileCopyrightText: 2026 Tallybot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator trait definitions.
//!
//! The chat platform is reached through [`Messenger`], defined here so the
//! ingest and ranking logic can be tested against mocks.

pub mod messenger;

pub use messenger::{Messenger, Profile};
