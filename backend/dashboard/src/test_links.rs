//! Test links run a named backend test (or the whole bundle), time it,
//! describe the result for the user, and save a report.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{error, info, warn};

use crate::api_client::ApiClient;
use crate::models::{BundleResult, TestRequest};
use crate::reports::{ReportStore, TestReport};

const BUNDLE_ENDPOINT: &str = "/api/v1/tests/bundle";
const SINGLE_ENDPOINT: &str = "/api/v1/tests/run";

/// A clickable test entry on the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestLink {
    /// Visible label, sent as `test_name`
    pub name: String,
    /// Backend test type; `bundle` runs every test
    #[serde(default)]
    pub test_type: Option<String>,
}

impl TestLink {
    fn normalized_type(&self) -> String {
        self.test_type
            .as_deref()
            .unwrap_or_default()
            .trim()
            .to_lowercase()
    }

    pub fn is_bundle(&self) -> bool {
        self.normalized_type() == "bundle"
    }
}

#[derive(Debug, Clone)]
pub struct TestLinkOutcome {
    /// Text for the test log panel
    pub message: String,
    pub report: TestReport,
    /// Id of the stored report, if it was saved
    pub saved_id: Option<i64>,
}

#[derive(Clone)]
pub struct TestLinkHandler {
    api: ApiClient,
    store: Option<Arc<dyn ReportStore>>,
}

impl TestLinkHandler {
    pub fn new(api: ApiClient, store: Option<Arc<dyn ReportStore>>) -> Self {
        Self { api, store }
    }

    /// Run the link's test. Transport failures are reported in the outcome
    /// (status `0`), never as an error.
    pub async fn run(&self, link: &TestLink) -> TestLinkOutcome {
        let test_type = link.normalized_type();
        let bundle = link.is_bundle();

        let (endpoint, segments, body) = if bundle {
            (BUNDLE_ENDPOINT, ["tests", "bundle"], None)
        } else {
            let request = TestRequest {
                test_type: if test_type.is_empty() {
                    "unknown".to_string()
                } else {
                    test_type.clone()
                },
                test_name: link.name.clone(),
                parameters: Map::new(),
            };
            let body = serde_json::to_value(&request).ok();
            (SINGLE_ENDPOINT, ["tests", "run"], body)
        };
        let request_body = body.as_ref().map(Value::to_string);
        let kind = match test_type.as_str() {
            "" => "individual".to_string(),
            other => other.to_string(),
        };

        info!("Running test link '{}' via {endpoint}", link.name);
        let started = Instant::now();
        let result = self
            .api
            .request_raw(Method::POST, &segments, body.as_ref())
            .await;
        let response_time_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let (mut message, mut report, failed) = match result {
            Ok(raw) => {
                let parsed = serde_json::from_str::<Value>(&raw.text)
                    .unwrap_or_else(|_| Value::String(raw.text.clone()));

                let message = if bundle && parsed.is_object() {
                    let summary: BundleResult =
                        serde_json::from_value(parsed.clone()).unwrap_or_default();
                    bundle_message(&summary)
                } else {
                    format!("Status {}: {}", raw.status.as_u16(), pretty(&parsed))
                };

                let report = TestReport {
                    kind,
                    name: link.name.clone(),
                    endpoint: endpoint.to_string(),
                    method: Method::POST.to_string(),
                    status: raw.status.as_u16(),
                    response_time_ms,
                    success: raw.status.is_success(),
                    request_body,
                    response: Some(parsed),
                    error: None,
                    full_report: String::new(),
                };
                (message, report, false)
            }
            Err(e) => {
                warn!("Test link '{}' failed: {e}", link.name);
                let report = TestReport {
                    kind,
                    name: link.name.clone(),
                    endpoint: endpoint.to_string(),
                    method: Method::POST.to_string(),
                    status: 0,
                    response_time_ms,
                    success: false,
                    request_body,
                    response: None,
                    error: Some(e.to_string()),
                    full_report: String::new(),
                };
                (format!("Fehler bei {}: {e}", link.name), report, true)
            }
        };
        report.full_report = format_test_report(&report, Utc::now());

        let saved_id = self.persist(&report, failed, &mut message).await;

        TestLinkOutcome {
            message,
            report,
            saved_id,
        }
    }

    async fn persist(&self, report: &TestReport, failed: bool, message: &mut String) -> Option<i64> {
        let Some(store) = &self.store else {
            warn!("No report store configured, report for '{}' not saved", report.name);
            message.push_str("\n\nWarnung: Kein Report-Speicher verfügbar, Report nicht gespeichert.");
            return None;
        };

        match store.save(report).await {
            Ok(id) => {
                let saved = if failed {
                    "Fehler-Report wurde gespeichert und ist im Reports-Menü verfügbar."
                } else {
                    "Report wurde gespeichert und ist im Reports-Menü verfügbar."
                };
                message.push_str("\n\n");
                message.push_str(saved);
                Some(id)
            }
            Err(e) => {
                error!("Failed to save report for '{}': {e}", report.name);
                message.push_str("\n\nFehler: Report konnte nicht gespeichert werden.");
                None
            }
        }
    }
}

fn pretty(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

/// Summary text for a bundle run.
pub fn bundle_message(bundle: &BundleResult) -> String {
    let s = &bundle.summary;
    let mut message = format!(
        "Bundle-Funktionstest abgeschlossen: {}/{} bestanden",
        s.passed, s.total
    );
    if s.failed > 0 || s.errors > 0 {
        message.push_str(&format!("\nFehlgeschlagen: {}, Fehler: {}", s.failed, s.errors));
    }

    if let Some(results) = &bundle.results {
        message.push_str("\n\nDetails:\n");
        for result in results {
            let (icon, verdict) = if result.success {
                ('✓', "OK")
            } else {
                ('✗', "FEHLER")
            };
            message.push_str(&format!("{icon} {}: {verdict}\n", result.test_name));
            if let Some(err) = result.error.as_deref().filter(|_| !result.success) {
                message.push_str(&format!("   Fehler: {err}\n"));
            }
        }
    }
    message
}

/// Plain-text report stored alongside the structured fields.
pub fn format_test_report(report: &TestReport, at: DateTime<Utc>) -> String {
    let verdict = if (200..300).contains(&report.status) {
        "SUCCESS"
    } else {
        "FAILED"
    };

    let mut text = format!("TEST REPORT: {}\n", report.name);
    text.push_str("==========================\n\n");
    text.push_str(&format!("Zeitstempel: {}\n", at.to_rfc3339()));
    text.push_str(&format!("Test Name: {}\n", report.name));
    text.push_str(&format!("Endpoint: {}\n", report.endpoint));
    text.push_str(&format!("Method: {}\n", report.method));
    text.push_str(&format!("Status: {}\n", report.status));
    text.push_str(&format!("Response Time: {}ms\n", report.response_time_ms));
    text.push_str(&format!("Result: {verdict}\n\n"));

    if let Some(body) = &report.request_body {
        text.push_str(&format!("Request Body:\n{body}\n\n"));
    }
    if let Some(err) = &report.error {
        text.push_str(&format!("Error:\n{err}\n\n"));
    }
    if let Some(response) = &report.response {
        text.push_str(&format!("Response:\n{}\n\n", pretty(response)));
    }

    text.push_str(&format!(
        "Test completed at: {}\n",
        at.format("%d.%m.%Y, %H:%M:%S")
    ));
    text
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use reqwest::Client;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::config::RouteStyle;
    use crate::models::{BundleSummary, TestRunResult};
    use crate::reports::SqliteReportStore;

    fn api_for(uri: &str) -> ApiClient {
        ApiClient::new(Client::new(), uri, RouteStyle::Dashboard).unwrap()
    }

    fn link(name: &str, test_type: &str) -> TestLink {
        TestLink {
            name: name.to_string(),
            test_type: Some(test_type.to_string()),
        }
    }

    #[tokio::test]
    async fn single_test_posts_request_and_warns_without_store() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/tests/run"))
            .and(body_json(json!({
                "test_type": "wallet_balance",
                "test_name": "Wallet Balance",
                "parameters": {}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
            .expect(1)
            .mount(&server)
            .await;

        let handler = TestLinkHandler::new(api_for(&server.uri()), None);
        let outcome = handler.run(&link("Wallet Balance", "Wallet_Balance")).await;

        assert!(outcome.message.starts_with("Status 200: {"));
        assert!(outcome.message.contains("Kein Report-Speicher verfügbar"));
        assert!(outcome.report.success);
        assert_eq!(outcome.report.kind, "wallet_balance");
        assert!(outcome.saved_id.is_none());
    }

    #[tokio::test]
    async fn missing_type_is_sent_as_unknown() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/tests/run"))
            .and(body_json(json!({
                "test_type": "unknown",
                "test_name": "Mystery",
                "parameters": {}
            })))
            .respond_with(ResponseTemplate::new(404).set_body_string("no such test"))
            .expect(1)
            .mount(&server)
            .await;

        let handler = TestLinkHandler::new(api_for(&server.uri()), None);
        let outcome = handler
            .run(&TestLink {
                name: "Mystery".to_string(),
                test_type: None,
            })
            .await;
        assert!(outcome.message.starts_with("Status 404: no such test"));
        assert!(!outcome.report.success);
        assert_eq!(outcome.report.kind, "individual");
    }

    #[tokio::test]
    async fn bundle_result_is_summarised_and_saved() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/tests/bundle"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "bundle_name": "Complete Test Suite",
                "summary": { "total": 2, "passed": 1, "failed": 1, "errors": 1 },
                "results": [
                    { "test_name": "Wallet Balance", "success": true },
                    { "test_name": "Trade Execute", "success": false, "error": "timed out" }
                ]
            })))
            .mount(&server)
            .await;

        let store = SqliteReportStore::connect("sqlite::memory:").await.unwrap();
        let store: Arc<dyn ReportStore> = Arc::new(store);
        let handler = TestLinkHandler::new(api_for(&server.uri()), Some(store.clone()));
        let outcome = handler.run(&link("Bundle", "BUNDLE")).await;

        assert!(outcome
            .message
            .starts_with("Bundle-Funktionstest abgeschlossen: 1/2 bestanden\nFehlgeschlagen: 1, Fehler: 1"));
        assert!(outcome.message.contains("✗ Trade Execute: FEHLER\n   Fehler: timed out"));
        assert!(outcome
            .message
            .ends_with("Report wurde gespeichert und ist im Reports-Menü verfügbar."));

        let id = outcome.saved_id.unwrap();
        let stored = store.get(id).await.unwrap().unwrap();
        assert_eq!(stored.kind, "bundle");
        assert_eq!(stored.endpoint, "/api/v1/tests/bundle");
        assert!(stored.full_report.contains("Result: SUCCESS"));
    }

    #[tokio::test]
    async fn transport_failure_produces_error_report() {
        // Bind then drop a listener so nothing answers on the port.
        let uri = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            format!("http://{}", listener.local_addr().unwrap())
        };

        let store = SqliteReportStore::connect("sqlite::memory:").await.unwrap();
        let handler = TestLinkHandler::new(api_for(&uri), Some(Arc::new(store)));
        let outcome = handler.run(&link("Agent Status", "agent_status")).await;

        assert!(outcome.message.starts_with("Fehler bei Agent Status: "));
        assert!(outcome.message.contains("Fehler-Report wurde gespeichert"));
        assert_eq!(outcome.report.status, 0);
        assert!(outcome.report.error.is_some());
        assert!(outcome.report.full_report.contains("Result: FAILED"));
    }

    #[test]
    fn bundle_message_all_passed_has_no_failure_line() {
        let bundle = BundleResult {
            bundle_name: None,
            summary: BundleSummary {
                total: 1,
                passed: 1,
                ..Default::default()
            },
            results: Some(vec![TestRunResult {
                test_name: "System Health".to_string(),
                success: true,
                ..Default::default()
            }]),
        };
        assert_eq!(
            bundle_message(&bundle),
            "Bundle-Funktionstest abgeschlossen: 1/1 bestanden\n\nDetails:\n✓ System Health: OK\n"
        );
    }

    #[test]
    fn bundle_message_details_follow_results_array() {
        let mut bundle = BundleResult {
            summary: BundleSummary {
                total: 0,
                ..Default::default()
            },
            results: Some(Vec::new()),
            ..Default::default()
        };
        assert!(bundle_message(&bundle).ends_with("\n\nDetails:\n"));

        bundle.results = None;
        assert_eq!(
            bundle_message(&bundle),
            "Bundle-Funktionstest abgeschlossen: 0/0 bestanden"
        );
    }

    #[test]
    fn report_text_layout() {
        let report = TestReport {
            kind: "ideas_list".to_string(),
            name: "Ideas List".to_string(),
            endpoint: SINGLE_ENDPOINT.to_string(),
            method: "POST".to_string(),
            status: 500,
            response_time_ms: 12,
            success: false,
            request_body: Some("{}".to_string()),
            response: Some(json!("boom")),
            error: None,
            full_report: String::new(),
        };
        let at = Utc.with_ymd_and_hms(2025, 9, 16, 20, 6, 17).unwrap();
        let text = format_test_report(&report, at);

        assert!(text.starts_with("TEST REPORT: Ideas List\n==========================\n\n"));
        assert!(text.contains("Zeitstempel: 2025-09-16T20:06:17+00:00\n"));
        assert!(text.contains("Response Time: 12ms\nResult: FAILED\n\n"));
        assert!(text.contains("Request Body:\n{}\n\n"));
        assert!(text.contains("Response:\nboom\n\n"));
        assert!(!text.contains("Error:"));
        assert!(text.ends_with("Test completed at: 16.09.2025, 20:06:17\n"));
    }
}
