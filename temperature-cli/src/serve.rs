//! Process bootstrap: one function per process role.

use anyhow::{Context, Result};
use axum::Router;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use temperature_core::{
    Config, EmbeddedSink, Scraper, TemperatureSink, ThresholdClassifier, api,
    provider::provider_from_config,
    rpc::{RemoteService, RemoteSink, scraper_router, store_router},
};
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Assemble the query facade around the given sink.
pub fn build_scraper(config: &Config, sink: Arc<dyn TemperatureSink>) -> Result<Scraper> {
    let provider = provider_from_config(&config.forecast)?;
    let classifier = ThresholdClassifier::from(&config.alert);
    info!(
        low = classifier.low,
        high = classifier.high,
        url = %config.forecast.url,
        "scraper configured"
    );
    Ok(Scraper::new(provider, Arc::new(classifier), sink))
}

pub fn open_store(config: &Config) -> Result<EmbeddedSink> {
    let path = config.store.database_path()?;
    let sink = EmbeddedSink::open(&path)
        .with_context(|| format!("Failed to open temperature store: {}", path.display()))?;
    info!(path = %path.display(), "temperature store opened");
    Ok(sink)
}

/// Inbound query interface backed by a remote scraper.
pub async fn run_api(config: &Config) -> Result<()> {
    let service = RemoteService::new(
        config.api.scraper_url.clone(),
        Duration::from_secs(config.api.rpc_timeout_secs),
    )?;
    info!(scraper = %config.api.scraper_url, "query API starting");
    serve(config.api.listen, api::build_router(Arc::new(service))).await
}

/// Fetch-and-classify process backed by a remote store.
pub async fn run_scraper(config: &Config) -> Result<()> {
    let sink = RemoteSink::new(
        config.scraper.store_url.clone(),
        Duration::from_secs(config.scraper.rpc_timeout_secs),
    )?;
    let scraper = build_scraper(config, Arc::new(sink))?;
    info!(store = %config.scraper.store_url, "scraper starting");
    serve(config.scraper.listen, scraper_router(Arc::new(scraper))).await
}

/// Persistence process.
pub async fn run_store(config: &Config) -> Result<()> {
    let sink = open_store(config)?;
    info!("store starting");
    serve(config.store.listen, store_router(Arc::new(sink))).await
}

/// All roles in one process; the query interface calls the facade directly.
pub async fn run_standalone(config: &Config) -> Result<()> {
    let sink = open_store(config)?;
    let scraper = build_scraper(config, Arc::new(sink))?;
    info!("standalone mode starting");
    serve(config.api.listen, api::build_router(Arc::new(scraper))).await
}

async fn serve(addr: SocketAddr, router: Router) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(%addr, "listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server stopped with an error")?;

    info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
