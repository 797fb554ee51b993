//! Trading dashboard: entry point.
//!
//! Serves a single HTML page that drives the trading backend's REST API,
//! refreshes its lists in the background, and keeps test-link reports in
//! SQLite when a database is configured.

mod actions;
mod api_client;
mod banner;
mod config;
mod dashboard;
mod errors;
mod models;
mod page;
mod poller;
mod render;
mod reports;
mod server;
mod test_links;

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use api_client::ApiClient;
use config::Config;
use dashboard::Dashboard;
use reports::{ReportStore, SqliteReportStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG controls verbosity.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let _ = dotenvy::dotenv();

    let config = Config::from_env()?;

    let client = Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .build()?;
    let api = ApiClient::new(client, &config.api_base_url, config.route_style)?;
    info!("Backend API at {}", config.api_base_url);

    // ─── Report store (optional) ──────────────────────────
    let store: Option<Arc<dyn ReportStore>> = match &config.reports_database_url {
        Some(url) => match SqliteReportStore::connect(url).await {
            Ok(store) => {
                info!("Saving test reports to {url}");
                Some(Arc::new(store))
            }
            Err(e) => {
                warn!("Report store unavailable, reports will not be saved: {e}");
                None
            }
        },
        None => {
            info!("Report persistence disabled");
            None
        }
    };

    let dashboard = Arc::new(Dashboard::new(api, store));

    // ─── Background refresh ───────────────────────────────
    let shutdown = CancellationToken::new();
    let poller = tokio::spawn(poller::run(
        dashboard.clone(),
        Duration::from_secs(config.poll_interval_secs),
        shutdown.clone(),
    ));

    // ─── HTTP surface ─────────────────────────────────────
    let app = server::router(Arc::new(server::ApiState {
        dashboard,
        poll_interval_secs: config.poll_interval_secs,
    }));

    let addr = format!("0.0.0.0:{}", config.listen_port);
    info!("Dashboard listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let signal = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for shutdown signal: {e}");
                std::future::pending::<()>().await;
            }
            info!("Shutting down");
            signal.cancel();
        })
        .await?;

    shutdown.cancel();
    poller.await?;
    Ok(())
}
