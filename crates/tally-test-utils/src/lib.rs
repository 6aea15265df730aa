// SPDX-FileCopyrightText: 2026 Tallybot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for tallybot.
//!
//! Provides [`MockMessenger`], a deterministic in-memory stand-in for the
//! chat platform used by ingest, ranking, and gateway tests.

pub mod mock_messenger;

pub use mock_messenger::MockMessenger;
