mod api;
mod builder;
mod config;
mod db;
mod engine;
mod error;
mod identity;
mod ingest;
mod parser;
mod sampler;
mod source;
mod types;

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::api::routes::{router, ApiState};
use crate::config::Config;
use crate::db::MatchStore;
use crate::engine::poller::PollingEngine;
use crate::error::Result;
use crate::sampler::{HttpMetricsSource, NoMetrics};
use crate::source::HttpBlockSource;

#[tokio::main]
async fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    if let Err(e) = run(cfg).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(cfg: Config) -> Result<()> {
    // --- Database setup ---
    let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}", cfg.db_path))?
        .create_if_missing(true);
    let pool = SqlitePool::connect_with(opts).await?;
    let store = MatchStore::new(pool);
    store.init_schema().await?;
    info!("Database ready at {}", cfg.db_path);

    // --- Bootstrap ingest: populate today's match set before polling ---
    let block_source = HttpBlockSource::new(cfg.source_url.clone(), cfg.source_timeout_secs)?;
    let bootstrapped = match ingest::run_ingest(&block_source, &store, &cfg.policy).await {
        Ok(stats) => {
            info!(
                "Bootstrap ingest: {} matches from {} blocks ({} live, {} upcoming)",
                stats.ingested, stats.blocks_total, stats.live, stats.upcoming,
            );
            true
        }
        Err(e) => {
            // Not fatal: the engine retries at the next ingest window and
            // any previously committed dataset keeps being polled.
            warn!("Bootstrap ingest failed, will retry at the ingest window: {e}");
            false
        }
    };

    // --- Polling engine ---
    match cfg.metrics_url.clone() {
        Some(metrics_url) => {
            let metrics = HttpMetricsSource::new(metrics_url, cfg.source_timeout_secs)?;
            let engine = PollingEngine::new(
                cfg.clone(),
                store.clone(),
                block_source,
                metrics,
                bootstrapped,
            );
            tokio::spawn(async move { engine.run().await });
        }
        None => {
            let engine = PollingEngine::new(
                cfg.clone(),
                store.clone(),
                block_source,
                NoMetrics,
                bootstrapped,
            );
            tokio::spawn(async move { engine.run().await });
        }
    }
    info!(
        "Polling engine started (tick every {}s, ingest at {:02}:00 UTC)",
        cfg.tick_interval_secs, cfg.ingest_hour_utc,
    );

    // --- Read-only status API ---
    let app = router(ApiState { store });
    let bind_addr = format!("0.0.0.0:{}", cfg.api_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("HTTP API listening on {bind_addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
