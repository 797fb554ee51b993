//! Long-running background task that re-fetches ideas, orders and history
//! on a fixed interval.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::dashboard::Dashboard;

/// Refresh the dashboard every `interval` until `shutdown` is cancelled.
///
/// Failures are logged and otherwise ignored so the last good snapshot stays
/// on screen. The first refresh runs immediately.
pub async fn run(dashboard: Arc<Dashboard>, interval: Duration, shutdown: CancellationToken) {
    info!("Poller starting, interval {}s", interval.as_secs());

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                info!("Poller stopped");
                return;
            }
            _ = ticker.tick() => {
                if let Err(e) = dashboard.refresh().await {
                    warn!("Dashboard refresh failed: {e}");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use reqwest::Client;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::api_client::ApiClient;
    use crate::config::RouteStyle;

    #[tokio::test]
    async fn polls_until_cancelled() {
        let server = MockServer::start().await;
        for p in ["/api/v1/ideas", "/api/v1/orders", "/api/v1/history"] {
            Mock::given(method("GET"))
                .and(path(p))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
                .mount(&server)
                .await;
        }

        let api = ApiClient::new(Client::new(), &server.uri(), RouteStyle::Dashboard).unwrap();
        let dashboard = Arc::new(Dashboard::new(api, None));
        let shutdown = CancellationToken::new();

        let task = tokio::spawn(run(
            dashboard.clone(),
            Duration::from_millis(20),
            shutdown.clone(),
        ));
        tokio::time::sleep(Duration::from_millis(150)).await;
        shutdown.cancel();
        task.await.unwrap();

        let requests = server.received_requests().await.unwrap();
        let idea_polls = requests
            .iter()
            .filter(|r| r.url.path() == "/api/v1/ideas")
            .count();
        assert!(idea_polls >= 2, "expected repeated polls, got {idea_polls}");
        assert!(dashboard.snapshot().await.refreshed_at.is_some());
    }

    #[tokio::test]
    async fn errors_do_not_stop_the_loop() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/ideas"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let api = ApiClient::new(Client::new(), &server.uri(), RouteStyle::Dashboard).unwrap();
        let dashboard = Arc::new(Dashboard::new(api, None));
        let shutdown = CancellationToken::new();

        let task = tokio::spawn(run(
            dashboard.clone(),
            Duration::from_millis(20),
            shutdown.clone(),
        ));
        tokio::time::sleep(Duration::from_millis(120)).await;
        shutdown.cancel();
        task.await.unwrap();

        let polls = server.received_requests().await.unwrap().len();
        assert!(polls >= 2);
        assert_eq!(dashboard.snapshot().await.banner.text(), "Fehler: Bad Gateway");
    }
}
