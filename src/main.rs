use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::{net::TcpListener, sync::watch};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use bgp_ls_topology::{
    api,
    parsers::bgp_ls::Normalizer,
    settings::{Cli, Settings},
    topology::{LsdbPipeline, QueryEngine, RefreshDriver, TopologyStore},
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let settings = Settings::load(&cli).context("failed to load settings")?;

    let pipeline = LsdbPipeline::new(
        settings.source.build_source()?,
        Normalizer::new(settings.refresh.path_selection),
        settings.source.fetch_timeout,
    );
    info!(
        source = %pipeline.describe_source(),
        interval = ?settings.refresh.interval,
        "starting BGP-LS topology service"
    );
    let store = Arc::new(TopologyStore::new());
    let mut driver = RefreshDriver::new(pipeline, Arc::clone(&store), settings.refresh.interval);

    if !settings.source.startup_delay.is_zero() {
        info!(delay = ?settings.source.startup_delay, "waiting for the BGP speaker to come up");
        tokio::time::sleep(settings.source.startup_delay).await;
    }
    // Queries answer 503 until a build succeeds; the loop keeps retrying.
    if driver.refresh_once().await.is_err() {
        warn!("initial build failed, serving nothing until the next refresh succeeds");
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let refresh = driver.spawn(shutdown_rx.clone());

    let app = api::router(QueryEngine::new(store));
    let listener = TcpListener::bind(settings.api.listen)
        .await
        .with_context(|| format!("failed to bind {}", settings.api.listen))?;
    info!("HTTP API listening on {}", listener.local_addr()?);

    let mut server_shutdown = shutdown_rx;
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        let _ = server_shutdown.wait_for(|stop| *stop).await;
    });
    let server = tokio::spawn(async move { server.await });

    tokio::signal::ctrl_c().await.context("failed to listen for Ctrl-C")?;
    info!("shutting down");
    shutdown_tx.send(true)?;

    refresh.await?;
    server.await??;
    Ok(())
}
