// SPDX-FileCopyrightText: 2026 Tallybot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `tallybot serve` command implementation.
//!
//! Opens the counter database, builds the LINE client, and wires the
//! ingestor, the webhook server, and the three scheduled jobs together.
//! All components receive the database handle and the messenger explicitly
//! at construction; nothing is ambient. Supports graceful shutdown via
//! signal handlers.

use std::sync::Arc;

use tracing::{error, info, warn};

use tally_agent::{Aggregator, Ingestor, shutdown};
use tally_config::TallyConfig;
use tally_core::TallyError;
use tally_core::traits::Messenger;
use tally_cron::build_scheduler;
use tally_gateway::{GatewayState, ServerConfig, start_server};
use tally_line::LineClient;
use tally_storage::Database;

/// Runs the `tallybot serve` command.
pub async fn run_serve(config: TallyConfig) -> Result<(), TallyError> {
    init_tracing(&config.bot.log_level);

    info!(name = %config.bot.name, keyword = %config.bot.keyword, "starting tallybot serve");

    // Open storage; migrations run here.
    let db = Database::open_with_options(&config.storage.database_path, config.storage.wal_mode)
        .await?;

    // The LINE client serves both profile lookups and ranking pushes.
    let messenger: Arc<dyn Messenger> = Arc::new(LineClient::new(&config.line)?);

    if config.line.channel_secret.is_none() {
        warn!("line.channel_secret is not set; webhook signature verification is DISABLED");
    }

    let ingestor = Arc::new(Ingestor::new(
        db.clone(),
        Arc::clone(&messenger),
        config.bot.keyword.clone(),
    ));
    let aggregator = Arc::new(Aggregator::new(db.clone(), Arc::clone(&messenger)));

    // Scheduled jobs: daily ranking, weekly ranking, retention sweep.
    let scheduler = build_scheduler(
        &config.schedule,
        db.clone(),
        aggregator,
        &config.bot.keyword,
    )?;
    let cancel = shutdown::install_signal_handler();
    let job_cancel = scheduler.cancellation_token();
    let job_handles = scheduler.spawn();

    // Webhook server as a background task.
    let server_config = ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
    };
    let state = GatewayState {
        ingestor,
        channel_secret: config.line.channel_secret.clone(),
    };
    let server_handle = tokio::spawn(async move {
        if let Err(e) = start_server(&server_config, state).await {
            error!(error = %e, "webhook server exited");
        }
    });

    // Wait for SIGINT/SIGTERM, then wind everything down.
    cancel.cancelled().await;

    job_cancel.cancel();
    for handle in job_handles {
        let _ = handle.await;
    }
    server_handle.abort();
    db.close().await?;

    info!("tallybot serve shutdown complete");
    Ok(())
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
