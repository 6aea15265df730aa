// SPDX-FileCopyrightText: 2026 Tallybot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP webhook server for tallybot.
//!
//! Receives LINE webhook batches on `POST /webhook`, verifies the delivery
//! signature against the raw body, and hands validated events to the
//! ingestor. The platform expects application-level failures to be
//! acknowledged with 200 (redelivery-on-error is not wanted), so only a
//! structurally unprocessable batch reports a server error.

pub mod handlers;
pub mod server;

pub use server::{GatewayState, ServerConfig, router, start_server};
