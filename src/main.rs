//! Job Scout — Binary Entrypoint
//! Boots the two long-running tasks (scheduler loop and delivery worker),
//! wired together through the in-process notification queue.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use job_scout::config::Config;
use job_scout::harvest::Harvester;
use job_scout::notify::{run_delivery_worker, DeliveryChannel};
use job_scout::notify::telegram::TelegramNotifier;
use job_scout::queue;
use job_scout::scheduler::run_scheduler;
use job_scout::scorer::{CandidateProfile, GroqScorer};
use job_scout::source::board_api::BoardApiAdapter;
use job_scout::store::JsonFileStore;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

/// Optional Prometheus exporter, gated by METRICS_ADDR (e.g. "0.0.0.0:9000").
fn init_metrics() -> Result<()> {
    let Ok(addr) = std::env::var("METRICS_ADDR") else {
        return Ok(());
    };
    let addr: SocketAddr = addr.parse().context("parsing METRICS_ADDR")?;
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .context("installing prometheus exporter")?;
    tracing::info!(%addr, "prometheus exporter listening");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op where the environment is already set.
    let _ = dotenvy::dotenv();
    init_tracing();
    if let Err(e) = init_metrics() {
        tracing::warn!(error = %e, "metrics exporter not started");
    }

    // Missing required configuration is the only fatal error; everything
    // after this point degrades instead of crashing.
    let cfg = Config::from_env()?;
    tracing::info!(targets = cfg.targets.len(), model = %cfg.groq_model, "job-scout starting");

    let store = Arc::new(JsonFileStore::open(&cfg.store_dir)?);
    let adapter = Arc::new(BoardApiAdapter::new(cfg.board_url.clone()));
    let scorer = Arc::new(GroqScorer::new(
        cfg.groq_api_key.clone(),
        cfg.groq_model.clone(),
    ));
    let profile = CandidateProfile::from_path(&cfg.profile_path);

    let channel: Option<Arc<dyn DeliveryChannel>> = cfg
        .telegram_bot_token
        .clone()
        .map(|token| Arc::new(TelegramNotifier::new(token)) as Arc<dyn DeliveryChannel>);

    let (notifications, stream) = queue::channel();
    let harvester = Arc::new(Harvester::new(&cfg, adapter, scorer, store, profile));

    let worker = tokio::spawn(run_delivery_worker(stream, channel));
    let scheduler = tokio::spawn(run_scheduler(
        harvester,
        notifications,
        cfg.harvest_interval,
    ));

    // Both loops run until the process is killed; the worker returns early
    // only when the delivery channel is unconfigured.
    let _ = tokio::join!(scheduler, worker);
    Ok(())
}
