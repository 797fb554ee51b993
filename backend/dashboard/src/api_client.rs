//! Typed client for the sepAI trading REST API.
//!
//! Every call is a single request/response cycle. There is no retry: a failed
//! call is surfaced to the caller, which decides whether to show it (banner)
//! or swallow it (periodic refresh).

use std::time::Instant;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::RouteStyle;
use crate::errors::{DashboardError, Result};
use crate::models::{
    decode_list, AuditResult, BundleResult, GenerateRequest, HistoryEntry, Idea, IdeaDraft,
    LatestReport, Order, SystemRunResult, TestRunResult, WalletBalance,
};

const API_PREFIX: [&str; 2] = ["api", "v1"];

/// Status and undecoded body of a response, for callers that must see
/// non-2xx responses instead of getting an error.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    route_style: RouteStyle,
}

impl ApiClient {
    pub fn new(client: Client, base_url: &str, route_style: RouteStyle) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| DashboardError::Config(format!("Invalid API_BASE_URL: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(DashboardError::Config(format!(
                "API_BASE_URL cannot carry a path: {base_url}"
            )));
        }
        Ok(Self {
            client,
            base_url,
            route_style,
        })
    }

    // ─────────────────────────────────────────────────────
    // Request wrapper
    // ─────────────────────────────────────────────────────

    /// Send a request to `path` (e.g. `/api/v1/ideas`) and return the JSON body.
    ///
    /// * A body that is not JSON is replaced by `{}`.
    /// * Non-2xx responses become [`DashboardError::Api`] with the body's
    ///   `detail` (or `error`) field, falling back to the status text.
    pub async fn request(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let url = self.url(&segments)?;
        self.send(method, url, body).await
    }

    async fn send(&self, method: Method, url: Url, body: Option<&Value>) -> Result<Value> {
        let raw = self.send_raw(method, url, body).await?;
        let parsed: Value =
            serde_json::from_str(&raw.text).unwrap_or_else(|_| Value::Object(Map::new()));

        if !raw.status.is_success() {
            return Err(DashboardError::Api {
                status: raw.status.as_u16(),
                message: error_message(&parsed, raw.status),
            });
        }
        Ok(parsed)
    }

    async fn send_raw(&self, method: Method, url: Url, body: Option<&Value>) -> Result<RawResponse> {
        let started = Instant::now();
        let mut request = self
            .client
            .request(method.clone(), url.clone())
            .header(CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        debug!(
            "{method} {} → {} in {}ms",
            url.path(),
            status.as_u16(),
            started.elapsed().as_millis()
        );
        Ok(RawResponse { status, text })
    }

    /// Like [`ApiClient::request`] but hands back status and body for any
    /// status code. Only transport failures are errors.
    pub async fn request_raw(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&Value>,
    ) -> Result<RawResponse> {
        let url = self.url(segments)?;
        self.send_raw(method, url, body).await
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        let body = self.send(Method::GET, self.url(segments)?, None).await?;
        Ok(serde_json::from_value(body)?)
    }

    async fn post_json<B, T>(&self, segments: &[&str], body: Option<&B>) -> Result<T>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        let body = body.map(serde_json::to_value).transpose()?;
        let response = self
            .send(Method::POST, self.url(segments)?, body.as_ref())
            .await?;
        Ok(serde_json::from_value(response)?)
    }

    /// `/api/v1/` + `segments`, each segment percent-encoded.
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                DashboardError::Config("API_BASE_URL cannot carry a path".to_string())
            })?;
            path.pop_if_empty();
            let already_prefixed = segments.starts_with(&API_PREFIX);
            if !already_prefixed {
                path.extend(API_PREFIX);
            }
            path.extend(segments);
        }
        Ok(url)
    }

    // ─────────────────────────────────────────────────────
    // Ideas
    // ─────────────────────────────────────────────────────

    pub async fn list_ideas(&self) -> Result<Vec<Idea>> {
        let body = self.get_json::<Value>(&["ideas"]).await?;
        decode_list(body, &["ideas"])
    }

    pub async fn create_idea(&self, draft: &IdeaDraft) -> Result<Idea> {
        self.post_json(&["ideas"], Some(draft)).await
    }

    pub async fn generate_idea(&self, request: &GenerateRequest) -> Result<Idea> {
        self.post_json(&["ideas", "generate"], Some(request)).await
    }

    /// NEW → NEEDS_REVIEW.
    pub async fn move_to_analysis(&self, idea_id: &str) -> Result<Value> {
        let segment = self.route_style.analysis_segment();
        self.post_json::<Value, _>(&["ideas", idea_id, segment], None)
            .await
    }

    /// NEEDS_REVIEW → scheduled order.
    pub async fn schedule_idea(&self, idea_id: &str) -> Result<Value> {
        let segment = self.route_style.schedule_segment();
        self.post_json::<Value, _>(&["ideas", idea_id, segment], None)
            .await
    }

    // ─────────────────────────────────────────────────────
    // Orders / history / wallet
    // ─────────────────────────────────────────────────────

    pub async fn list_orders(&self) -> Result<Vec<Order>> {
        let body = self.get_json::<Value>(&["orders"]).await?;
        decode_list(body, &["orders"])
    }

    pub async fn execute_order(&self, order_id: &str) -> Result<Value> {
        self.post_json::<Value, _>(&["orders", order_id, "execute"], None)
            .await
    }

    pub async fn list_history(&self) -> Result<Vec<HistoryEntry>> {
        let body = self.get_json::<Value>(&["history"]).await?;
        decode_list(body, &["history"])
    }

    pub async fn wallet_balance(&self) -> Result<WalletBalance> {
        self.get_json(&["wallet", "balance"]).await
    }

    // ─────────────────────────────────────────────────────
    // System run, reports, tests, audit
    // ─────────────────────────────────────────────────────

    pub async fn run_system(&self) -> Result<SystemRunResult> {
        self.post_json::<Value, _>(&["system", "run"], None).await
    }

    pub async fn latest_report(&self) -> Result<LatestReport> {
        self.get_json(&["reports", "latest"]).await
    }

    /// `GET /api/v1/tests/run?case={case}`
    ///
    /// A failing test may come back non-2xx with the result in the body, so
    /// the body is decoded either way. Only transport failures are errors.
    pub async fn run_test_case(&self, case: &str) -> Result<TestRunResult> {
        let mut url = self.url(&["tests", "run"])?;
        url.query_pairs_mut().append_pair("case", case);
        let raw = self.send_raw(Method::GET, url, None).await?;

        let body: Value =
            serde_json::from_str(&raw.text).unwrap_or_else(|_| Value::Object(Map::new()));
        let mut result: TestRunResult = serde_json::from_value(body.clone()).unwrap_or_default();
        if !raw.status.is_success() {
            result.success = false;
            if result.error.is_none() {
                result.error = Some(error_message(&body, raw.status));
            }
        }
        Ok(result)
    }

    /// The bundle endpoint is served as GET by older backends and POST by newer ones.
    pub async fn run_bundle(&self, method: Method) -> Result<BundleResult> {
        let body = self.request(method, "tests/bundle", None).await?;
        Ok(serde_json::from_value(body)?)
    }

    pub async fn run_audit(&self) -> Result<AuditResult> {
        self.post_json::<Value, _>(&["audit", "run"], None).await
    }
}

/// Pick the message of a failed response: `detail`, then `error`, then the
/// status reason phrase.
fn error_message(body: &Value, status: StatusCode) -> String {
    ["detail", "error"]
        .iter()
        .filter_map(|key| body.get(*key))
        .find_map(|v| match v {
            Value::Null => None,
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        })
        .or_else(|| status.canonical_reason().map(String::from))
        .unwrap_or_else(|| status.as_u16().to_string())
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::models::{IdeaState, OrderState};

    async fn client_for(server: &MockServer, style: RouteStyle) -> ApiClient {
        ApiClient::new(Client::new(), &server.uri(), style).unwrap()
    }

    #[tokio::test]
    async fn success_returns_parsed_body_and_sends_json_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/wallet/balance"))
            .and(header("content-type", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "balance": 123.45 })))
            .expect(1)
            .mount(&server)
            .await;

        let api = client_for(&server, RouteStyle::Dashboard).await;
        let body = api
            .request(Method::GET, "/api/v1/wallet/balance", None)
            .await
            .unwrap();
        assert_eq!(body, json!({ "balance": 123.45 }));
    }

    #[tokio::test]
    async fn non_json_success_body_becomes_empty_object() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/audit/run"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let api = client_for(&server, RouteStyle::Dashboard).await;
        let body = api.request(Method::POST, "/api/v1/audit/run", None).await.unwrap();
        assert_eq!(body, json!({}));
    }

    #[tokio::test]
    async fn error_uses_detail_field() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/orders/ord_1/execute"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({ "detail": "Order not found" })),
            )
            .mount(&server)
            .await;

        let api = client_for(&server, RouteStyle::Dashboard).await;
        let err = api.execute_order("ord_1").await.unwrap_err();
        match err {
            DashboardError::Api { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "Order not found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn error_falls_back_to_error_field_then_status_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/ideas"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({ "error": "budget too large" })),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/history"))
            .respond_with(ResponseTemplate::new(503).set_body_string("<html>down</html>"))
            .mount(&server)
            .await;

        let api = client_for(&server, RouteStyle::Dashboard).await;
        let draft = IdeaDraft {
            asset: None,
            chain: "solana".to_string(),
            budget: 5.0,
            description: String::new(),
        };
        let err = api.create_idea(&draft).await.unwrap_err();
        assert_eq!(err.banner_message(), "budget too large");

        let err = api.list_history().await.unwrap_err();
        assert_eq!(err.banner_message(), "Service Unavailable");
    }

    #[tokio::test]
    async fn list_endpoints_accept_either_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/ideas"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ideas": [
                    { "id": "i1", "chain": "solana", "budget": 0.05, "state": "NEW" },
                    { "id": "i2", "chain": "ethereum", "budget": 0.02, "state": "NEEDS_REVIEW" }
                ]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/orders"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{ "id": "o1", "idea_id": "i1", "state": "NEW" }]
            })))
            .mount(&server)
            .await;

        let api = client_for(&server, RouteStyle::Dashboard).await;
        let ideas = api.list_ideas().await.unwrap();
        assert_eq!(ideas.len(), 2);
        assert_eq!(ideas[1].state, IdeaState::NeedsReview);

        let orders = api.list_orders().await.unwrap();
        assert_eq!(orders[0].state, OrderState::New);
        assert_eq!(orders[0].idea_id.as_deref(), Some("i1"));
    }

    #[tokio::test]
    async fn route_style_selects_transition_paths() {
        let server = MockServer::start().await;
        for p in [
            "/api/v1/ideas/i1/to-analysis",
            "/api/v1/ideas/i1/schedule",
            "/api/v1/ideas/i1/analyze",
            "/api/v1/ideas/i1/to_orders",
        ] {
            Mock::given(method("POST"))
                .and(path(p))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "i1" })))
                .expect(1)
                .mount(&server)
                .await;
        }

        let dashboard = client_for(&server, RouteStyle::Dashboard).await;
        dashboard.move_to_analysis("i1").await.unwrap();
        dashboard.schedule_idea("i1").await.unwrap();

        let legacy = client_for(&server, RouteStyle::Legacy).await;
        legacy.move_to_analysis("i1").await.unwrap();
        legacy.schedule_idea("i1").await.unwrap();
    }

    #[tokio::test]
    async fn generate_sends_default_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/ideas/generate"))
            .and(body_json(json!({
                "asset": "SOL", "chain": "solana", "amount": 0.1, "risk": 3
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "idea_0001", "asset": "SOL", "chain": "solana", "state": "NEW"
            })))
            .mount(&server)
            .await;

        let api = client_for(&server, RouteStyle::Dashboard).await;
        let idea = api.generate_idea(&GenerateRequest::default()).await.unwrap();
        assert_eq!(idea.id, "idea_0001");
        assert_eq!(idea.state, IdeaState::New);
    }

    #[tokio::test]
    async fn raw_request_does_not_fail_on_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/tests/run"))
            .respond_with(ResponseTemplate::new(404).set_body_string("missing"))
            .mount(&server)
            .await;

        let api = client_for(&server, RouteStyle::Dashboard).await;
        let raw = api
            .request_raw(Method::POST, &["tests", "run"], None)
            .await
            .unwrap();
        assert_eq!(raw.status, StatusCode::NOT_FOUND);
        assert_eq!(raw.text, "missing");
    }

    #[test]
    fn base_url_must_parse() {
        let err = ApiClient::new(Client::new(), "not a url", RouteStyle::Dashboard).unwrap_err();
        assert!(matches!(err, DashboardError::Config(_)));
    }

    #[test]
    fn error_message_prefers_detail() {
        let body = json!({ "detail": "Idea not found", "error": "other" });
        assert_eq!(error_message(&body, StatusCode::NOT_FOUND), "Idea not found");
        assert_eq!(error_message(&json!({}), StatusCode::NOT_FOUND), "Not Found");
    }
}
