// SPDX-FileCopyrightText: 2026 Tallybot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./tallybot.toml` > `~/.config/tallybot/tallybot.toml`
//! > `/etc/tallybot/tallybot.toml` with environment variable overrides via the
//! `TALLY_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::TallyConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/tallybot/tallybot.toml` (system-wide)
/// 3. `~/.config/tallybot/tallybot.toml` (user XDG config)
/// 4. `./tallybot.toml` (local directory)
/// 5. `TALLY_*` environment variables
pub fn load_config() -> Result<TallyConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TallyConfig::default()))
        .merge(Toml::file("/etc/tallybot/tallybot.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("tallybot/tallybot.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("tallybot.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env vars).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<TallyConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TallyConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<TallyConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TallyConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `TALLY_LINE_CHANNEL_TOKEN` must map to
/// `line.channel_token`, not `line.channel.token`.
fn env_provider() -> Env {
    Env::prefixed("TALLY_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: TALLY_LINE_CHANNEL_TOKEN -> "line_channel_token"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("bot_", "bot.", 1)
            .replacen("line_", "line.", 1)
            .replacen("server_", "server.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("schedule_", "schedule.", 1);
        mapped.into()
    })
}
