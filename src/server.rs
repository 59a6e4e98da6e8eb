//! HTTP server initialization and runtime setup.
//!
//! Handles storage selection, worker spawning, and Axum server lifecycle.

use crate::api::middleware::rate_limit::RateLimit;
use crate::application::dispatcher::VerificationDispatcher;
use crate::application::redirect_budget::RedirectBudget;
use crate::application::workers::{PendingSweep, ProbePolicy, QrWorker, ReachabilityProbe};
use crate::config::Config;
use crate::domain::TaskKind;
use crate::domain::click_worker::run_click_worker;
use crate::domain::qr::QrEncoder;
use crate::domain::repositories::{ClickRepository, LinkRegistry, QrStore};
use crate::infrastructure::http_check::HttpReachabilityCheck;
use crate::infrastructure::memory::{MemoryClickRepository, MemoryLinkRegistry, MemoryQrStore};
use crate::infrastructure::persistence::{PgClickRepository, PgLinkRegistry};
use crate::infrastructure::qr::{FsQrStore, SvgQrEncoder};
use crate::routes::app_router;
use crate::state::{AppState, Backends};

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::sync::mpsc;

/// How long the click worker gets to drain after the listener closes.
const CLICK_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL pool and migrations, or in-memory storage
/// - QR image store (filesystem or memory)
/// - Verification dispatcher with reachability and QR consumers
/// - Background click worker and optional pending sweep
/// - Axum HTTP server with graceful shutdown on Ctrl+C
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - The QR directory cannot be created
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let (registry, clicks) = connect_storage(&config).await?;
    let backends = Backends {
        registry,
        clicks,
        qr_store: open_qr_store(&config).await?,
    };

    let budget = Arc::new(RedirectBudget::new(config.redirect_refill_interval()));
    let dispatcher = Arc::new(VerificationDispatcher::new(config.task_queue_capacity));
    let encoder = Arc::new(SvgQrEncoder::default());

    let check = HttpReachabilityCheck::new(config.probe_timeout())
        .context("Failed to build HTTP client for reachability probe")?;
    let probe = ReachabilityProbe::new(
        backends.registry.clone(),
        Arc::new(check),
        ProbePolicy {
            max_attempts: config.probe_max_attempts as usize,
            retry_wait: config.probe_retry_wait(),
        },
    );
    dispatcher.subscribe(
        TaskKind::Reachability,
        Arc::new(probe),
        config.reachability_workers,
    )?;

    let qr_worker = QrWorker::new(
        backends.registry.clone(),
        backends.qr_store.clone(),
        encoder.clone(),
    );
    dispatcher.subscribe(TaskKind::Qr, Arc::new(qr_worker), config.qr_workers)?;

    let (click_tx, click_rx) = mpsc::channel(config.click_queue_capacity);
    let click_worker = tokio::spawn(run_click_worker(click_rx, backends.clicks.clone()));
    tracing::info!("Click worker started");

    let sweep = config.pending_sweep_period().map(|period| {
        let sweep = PendingSweep::new(
            backends.registry.clone(),
            dispatcher.clone(),
            config.base_url.clone(),
            config.pending_stale_after(),
        );
        tracing::info!(period_secs = period.as_secs(), "Pending sweep started");
        tokio::spawn(sweep.run(period))
    });

    let state = AppState::new(
        &backends,
        budget,
        dispatcher,
        click_tx,
        &config.base_url,
    )
    .with_qr_content_type(encoder.content_type())
    .with_behind_proxy(config.behind_proxy);

    let app = app_router(
        state,
        RateLimit {
            per_second: config.api_rate_per_second,
            burst: config.api_rate_burst,
            behind_proxy: config.behind_proxy,
        },
    )?;

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    if let Some(sweep) = sweep {
        sweep.abort();
    }

    // The router owned the last click sender; the worker exits once drained.
    if tokio::time::timeout(CLICK_DRAIN_TIMEOUT, click_worker)
        .await
        .is_err()
    {
        tracing::warn!("Click worker did not drain in time, pending clicks lost");
    }

    tracing::info!("Server stopped");
    Ok(())
}

async fn connect_storage(
    config: &Config,
) -> Result<(Arc<dyn LinkRegistry>, Arc<dyn ClickRepository>)> {
    let Some(database_url) = &config.database_url else {
        tracing::warn!("DATABASE_URL not set, links are kept in memory");
        let registry: Arc<dyn LinkRegistry> = Arc::new(MemoryLinkRegistry::new());
        let clicks: Arc<dyn ClickRepository> = Arc::new(MemoryClickRepository::new());
        return Ok((registry, clicks));
    };

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .connect(database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    let pool = Arc::new(pool);
    let registry: Arc<dyn LinkRegistry> = Arc::new(PgLinkRegistry::new(pool.clone()));
    let clicks: Arc<dyn ClickRepository> = Arc::new(PgClickRepository::new(pool));

    Ok((registry, clicks))
}

async fn open_qr_store(config: &Config) -> Result<Arc<dyn QrStore>> {
    if config.qr_storage_dir.is_empty() {
        tracing::info!("QR images kept in memory");
        return Ok(Arc::new(MemoryQrStore::new()));
    }

    let store = FsQrStore::open(&config.qr_storage_dir)
        .await
        .with_context(|| format!("Failed to open QR directory '{}'", config.qr_storage_dir))?;
    tracing::info!(dir = %config.qr_storage_dir, "QR images stored on disk");
    Ok(Arc::new(store))
}

/// Resolves on Ctrl+C.
async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received, draining connections"),
        Err(e) => tracing::warn!(
            "Failed to listen for Ctrl+C: {}. Proceeding with shutdown anyway.",
            e
        ),
    }
}
