// SPDX-FileCopyrightText: 2026 Tallybot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for tallybot.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup.

use serde::{Deserialize, Serialize};

/// Top-level tallybot configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TallyConfig {
    /// Bot identity and counting behavior.
    #[serde(default)]
    pub bot: BotConfig,

    /// LINE Messaging API settings.
    #[serde(default)]
    pub line: LineConfig,

    /// Webhook server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Scheduled job settings.
    #[serde(default)]
    pub schedule: ScheduleConfig,
}

/// Bot identity and counting behavior.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BotConfig {
    /// Display name of the bot.
    #[serde(default = "default_bot_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// The literal substring whose presence in a message text causes a
    /// counter increment. Matched case-sensitively.
    #[serde(default = "default_keyword")]
    pub keyword: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: default_bot_name(),
            log_level: default_log_level(),
            keyword: default_keyword(),
        }
    }
}

fn default_bot_name() -> String {
    "tallybot".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_keyword() -> String {
    "\u{1F4A9}".to_string()
}

/// LINE Messaging API settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LineConfig {
    /// Channel access token for the Messaging API.
    #[serde(default)]
    pub channel_token: Option<String>,

    /// Channel secret used to verify webhook signatures.
    #[serde(default)]
    pub channel_secret: Option<String>,

    /// Base URL of the Messaging API. Overridable for tests.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Bound timeout applied to every profile lookup and push request.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            channel_token: None,
            channel_secret: None,
            api_base: default_api_base(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_api_base() -> String {
    "https://api.line.me".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

/// Webhook server settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    10000
}

/// Storage backend settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL journal mode.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    "tally.db".to_string()
}

fn default_wal_mode() -> bool {
    true
}

/// Scheduled job settings.
///
/// The cron expressions fire in local time. The weekly anchor weekday and
/// window length are configuration, not invariants.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ScheduleConfig {
    /// Daily ranking push, shortly after midnight.
    #[serde(default = "default_daily_cron")]
    pub daily_cron: String,

    /// Weekly ranking push, on a fixed weekday shortly after midnight.
    #[serde(default = "default_weekly_cron")]
    pub weekly_cron: String,

    /// Retention sweep, offset a few minutes after the daily ranking.
    #[serde(default = "default_retention_cron")]
    pub retention_cron: String,

    /// Age in days beyond which counter records are purged.
    #[serde(default = "default_retention_days")]
    pub retention_days: u64,

    /// Length of the weekly ranking window, ending the day before the fire date.
    #[serde(default = "default_window_days")]
    pub window_days: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            daily_cron: default_daily_cron(),
            weekly_cron: default_weekly_cron(),
            retention_cron: default_retention_cron(),
            retention_days: default_retention_days(),
            window_days: default_window_days(),
        }
    }
}

fn default_daily_cron() -> String {
    "5 0 * * *".to_string()
}

fn default_weekly_cron() -> String {
    "5 0 * * 5".to_string()
}

fn default_retention_cron() -> String {
    "10 0 * * *".to_string()
}

fn default_retention_days() -> u64 {
    30
}

fn default_window_days() -> u64 {
    7
}
