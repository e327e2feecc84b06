//! Mailer server binary.
//!
//! Wires the durable store, the queue and its workers, and the HTTP
//! surface together. All tuning comes from environment variables:
//!
//! - `MAILER_BIND` — listen address (default `127.0.0.1:8080`)
//! - `MAILER_DATA_DIR` — RocksDB directory; unset means in-memory storage
//! - `MAILER_WORKERS` — worker count (default 2)
//! - `MAILER_POLL_INTERVAL_MS` — idle-worker poll interval (default 100)
//! - `MAILER_RETENTION_SECS` — how long finished/failed jobs stay
//!   pollable (default 3600)
//! - `MAILER_EMAIL_STEPS` / `MAILER_EMAIL_PACING_MS` — delivery progress
//!   granularity (defaults 10 / 400)

use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use actors::{QueueOptions, TaskRegistry, start_queue};
use api::AppState;
use db::DbConfig;
use notify::{ConsoleSender, SendEmailTask};

/// Runtime configuration, read from the environment at startup.
#[derive(Debug)]
struct ServerConfig {
    bind: SocketAddr,
    db: DbConfig,
    workers: usize,
    poll_interval: Duration,
    retention: Duration,
    email_steps: u32,
    email_pacing: Duration,
}

impl ServerConfig {
    fn from_env() -> Self {
        let db = match std::env::var("MAILER_DATA_DIR") {
            Ok(dir) => DbConfig::rocksdb(dir),
            Err(_) => DbConfig::memory(),
        };

        Self {
            bind: env_or("MAILER_BIND", SocketAddr::from(([127, 0, 0, 1], 8080))),
            db,
            workers: env_or("MAILER_WORKERS", 2),
            poll_interval: Duration::from_millis(env_or("MAILER_POLL_INTERVAL_MS", 100)),
            retention: Duration::from_secs(env_or("MAILER_RETENTION_SECS", 3600)),
            email_steps: env_or("MAILER_EMAIL_STEPS", 10),
            email_pacing: Duration::from_millis(env_or("MAILER_EMAIL_PACING_MS", 400)),
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env();
    tracing::info!("Starting mailer server: {:?}", config);

    db::init(config.db.clone()).await?;

    let mut tasks = TaskRegistry::new();
    tasks.register(
        SendEmailTask::new(Arc::new(ConsoleSender))
            .with_steps(config.email_steps)
            .with_pacing(config.email_pacing),
    );
    tracing::info!("Registered task kinds: {:?}", tasks.task_types());

    let queue = start_queue(
        QueueOptions::default()
            .with_workers(config.workers)
            .with_poll_interval(config.poll_interval)
            .with_retention(config.retention),
        tasks,
    )
    .await?;

    // Surface job lifecycle transitions in the server log
    let mut events = queue.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            tracing::info!(job_id = %event.job_id(), "{}", event.description());
        }
    });

    let app = api::router(AppState {
        queue: queue.clone(),
    });

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    tracing::info!("Listening on {}", config.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    queue.shutdown();
    Ok(())
}
