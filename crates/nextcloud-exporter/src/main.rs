//! nextcloud-exporter: Prometheus exporter for the Nextcloud serverinfo API.
//!
//! Every scrape of `/metrics` triggers one request to the configured
//! serverinfo endpoint; nothing is cached between scrapes.
//!
//! # Usage
//!
//! ```text
//! nextcloud-exporter /etc/nextcloud-exporter.toml --listen 127.0.0.1:9205
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use nc_collector::{Collector, ServerInfoClient};
use nc_core::ExporterConfig;
use nc_metrics::Schema;

#[derive(Parser)]
#[command(name = "nextcloud-exporter", about = "Prometheus exporter for Nextcloud", version)]
struct Cli {
    /// Config file (TOML, or JSON with a .json extension).
    config: PathBuf,

    /// Listen address (`host:port` or `:port`), overrides `listen` from the
    /// config file.
    #[arg(long)]
    listen: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,nextcloud_exporter=debug,nc_collector=debug".into()),
        )
        .init();

    let cli = Cli::parse();

    let mut config = ExporterConfig::from_file(&cli.config)
        .with_context(|| format!("loading config {}", cli.config.display()))?;
    if let Some(listen) = cli.listen.as_deref() {
        config
            .set_listen(listen)
            .with_context(|| format!("invalid --listen {listen}"))?;
    }

    run(config).await
}

async fn run(config: ExporterConfig) -> anyhow::Result<()> {
    info!(
        url = %config.info_url,
        credentials = config.credentials.is_some(),
        timeout_ms = config.timeout.as_millis() as u64,
        "serverinfo target configured"
    );

    let schema = Arc::new(Schema::new());
    let client = ServerInfoClient::new(&config).context("building HTTP client")?;
    let collector = Arc::new(Collector::new(client, schema));

    let router = nc_api::build_router(collector);
    let listener = tokio::net::TcpListener::bind(config.listen.as_str())
        .await
        .with_context(|| format!("binding {}", config.listen))?;

    info!(
        listen = %config.listen,
        addr = %listener.local_addr()?,
        "exporter listening"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
            info!("shutdown signal received");
        })
        .await?;

    info!("exporter stopped");
    Ok(())
}
