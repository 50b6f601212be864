//! Upload processing worker binary.

use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use uproc_db::MySqlStatusStore;
use uproc_media::SystemRunner;
use uproc_queue::{JobQueue, RedisSlotIndex};
use uproc_storage::S3Store;
use uproc_worker::{Executor, PipelineContext, WorkerConfig};

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for TLS/HTTPS)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    // Load environment variables
    dotenvy::dotenv().ok();

    // Colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("uproc=info".parse().unwrap());

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    info!("Starting uproc-worker");

    let config = match WorkerConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load worker config: {}", e);
            std::process::exit(1);
        }
    };

    let timecodes = match config.load_timecodes() {
        Ok(t) => t,
        Err(e) => {
            error!("Failed to load timecodes: {}", e);
            std::process::exit(1);
        }
    };

    let store = match S3Store::from_env().await {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to create S3 client: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = store.check_connectivity().await {
        error!("S3 connectivity check failed: {}", e);
        std::process::exit(1);
    }

    let status = match MySqlStatusStore::connect(&config.mysql_dsn).await {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to connect to status store: {}", e);
            std::process::exit(1);
        }
    };

    let slots = match RedisSlotIndex::new(&config.redis_url) {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to create slot index: {}", e);
            std::process::exit(1);
        }
    };

    let queue = match JobQueue::from_env() {
        Ok(q) => q,
        Err(e) => {
            error!("Failed to create job queue: {}", e);
            std::process::exit(1);
        }
    };

    let ctx = PipelineContext::new(
        &config,
        Arc::new(SystemRunner::new()),
        Arc::new(store),
        Arc::new(slots),
        timecodes,
    );

    let executor = Executor::new(queue, Arc::new(status), ctx);

    if let Err(e) = executor.run().await {
        error!("Executor error: {}", e);
        std::process::exit(1);
    }
}
