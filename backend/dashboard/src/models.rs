//! View models for the records the trading API returns.
//!
//! The backend owns every one of these; the dashboard only reads them. All
//! fields other than identifiers are lenient (`#[serde(default)]`) because the
//! different backend versions disagree on which fields they send.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::errors::Result;

// ─────────────────────────────────────────────────────────
// Lifecycle states
// ─────────────────────────────────────────────────────────

/// Lifecycle state of an idea as reported by the backend.
///
/// ```text
/// NEW ──► NEEDS_REVIEW ──► SCHEDULED ──► CLOSED
///                                   └──► FAILED
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum IdeaState {
    New,
    NeedsReview,
    /// Reported by the research generator once scoring is attached.
    Analyzed,
    Scheduled,
    Closed,
    Failed,
    /// A state this dashboard does not know about; rendered verbatim.
    Other(String),
}

impl IdeaState {
    pub fn as_str(&self) -> &str {
        match self {
            Self::New => "NEW",
            Self::NeedsReview => "NEEDS_REVIEW",
            Self::Analyzed => "ANALYZED",
            Self::Scheduled => "SCHEDULED",
            Self::Closed => "CLOSED",
            Self::Failed => "FAILED",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for IdeaState {
    fn from(s: String) -> Self {
        match s.as_str() {
            "NEW" => Self::New,
            "NEEDS_REVIEW" => Self::NeedsReview,
            "ANALYZED" => Self::Analyzed,
            "SCHEDULED" => Self::Scheduled,
            "CLOSED" => Self::Closed,
            "FAILED" => Self::Failed,
            _ => Self::Other(s),
        }
    }
}

impl From<IdeaState> for String {
    fn from(state: IdeaState) -> Self {
        state.as_str().to_string()
    }
}

impl Default for IdeaState {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl fmt::Display for IdeaState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderState {
    New,
    Scheduled,
    Executing,
    Closed,
    Failed,
    Other(String),
}

impl OrderState {
    pub fn as_str(&self) -> &str {
        match self {
            Self::New => "NEW",
            Self::Scheduled => "SCHEDULED",
            Self::Executing => "EXECUTING",
            Self::Closed => "CLOSED",
            Self::Failed => "FAILED",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for OrderState {
    fn from(s: String) -> Self {
        match s.as_str() {
            "NEW" => Self::New,
            "SCHEDULED" => Self::Scheduled,
            "EXECUTING" => Self::Executing,
            "CLOSED" => Self::Closed,
            "FAILED" => Self::Failed,
            _ => Self::Other(s),
        }
    }
}

impl From<OrderState> for String {
    fn from(state: OrderState) -> Self {
        state.as_str().to_string()
    }
}

impl Default for OrderState {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl fmt::Display for OrderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─────────────────────────────────────────────────────────
// Records
// ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "IdeaRecord")]
pub struct Idea {
    pub id: String,
    pub asset: Option<String>,
    pub chain: Option<String>,
    pub budget: Option<f64>,
    pub amount: Option<f64>,
    pub risk: Option<i64>,
    pub state: IdeaState,
    pub description: Option<String>,
    pub ts: Option<String>,
}

/// Wire form of [`Idea`]. Older research endpoints send `status` instead of
/// `state`, and analyzed ideas carry both; `state` wins.
#[derive(Deserialize)]
struct IdeaRecord {
    #[serde(deserialize_with = "id_string")]
    id: String,
    #[serde(default)]
    asset: Option<String>,
    #[serde(default)]
    chain: Option<String>,
    #[serde(default)]
    budget: Option<f64>,
    #[serde(default)]
    amount: Option<f64>,
    #[serde(default)]
    risk: Option<i64>,
    #[serde(default)]
    state: Option<IdeaState>,
    #[serde(default)]
    status: Option<IdeaState>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    ts: Option<String>,
}

impl From<IdeaRecord> for Idea {
    fn from(r: IdeaRecord) -> Self {
        Self {
            id: r.id,
            asset: r.asset,
            chain: r.chain,
            budget: r.budget,
            amount: r.amount,
            risk: r.risk,
            state: r.state.or(r.status).unwrap_or_default(),
            description: r.description,
            ts: r.ts,
        }
    }
}

impl Idea {
    /// The budget column: `budget` if present, otherwise the order `amount`.
    pub fn budget_or_amount(&self) -> Option<f64> {
        self.budget.or(self.amount)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "OrderRecord")]
pub struct Order {
    pub id: String,
    pub idea_id: Option<String>,
    pub asset: Option<String>,
    pub chain: Option<String>,
    pub amount: Option<f64>,
    pub state: OrderState,
    pub txid: Option<String>,
    pub ts: Option<String>,
}

#[derive(Deserialize)]
struct OrderRecord {
    #[serde(deserialize_with = "id_string")]
    id: String,
    #[serde(default)]
    idea_id: Option<String>,
    #[serde(default)]
    asset: Option<String>,
    #[serde(default)]
    chain: Option<String>,
    #[serde(default)]
    amount: Option<f64>,
    #[serde(default)]
    state: Option<OrderState>,
    #[serde(default)]
    status: Option<OrderState>,
    #[serde(default)]
    txid: Option<String>,
    #[serde(default)]
    ts: Option<String>,
}

impl From<OrderRecord> for Order {
    fn from(r: OrderRecord) -> Self {
        Self {
            id: r.id,
            idea_id: r.idea_id,
            asset: r.asset,
            chain: r.chain,
            amount: r.amount,
            state: r.state.or(r.status).unwrap_or_default(),
            txid: r.txid,
            ts: r.ts,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(default, deserialize_with = "null_as_default")]
    pub ts: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub actor: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub event: String,
    #[serde(default, rename = "ref")]
    pub reference: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletBalance {
    /// Number or string depending on the backend.
    pub balance: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemRunResult {
    #[serde(default)]
    pub ok: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub report_path: String,
    #[serde(default)]
    pub steps: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LatestReport {
    #[serde(default)]
    pub found: bool,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub ok: Option<bool>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditResult {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub report_path: Option<String>,
}

/// Outcome of a single named test run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestRunResult {
    #[serde(default, deserialize_with = "null_as_default")]
    pub test_name: String,
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub status_code: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub output: String,
    #[serde(default)]
    pub error: Option<String>,
    /// Seconds.
    #[serde(default)]
    pub duration: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub timestamp: String,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BundleSummary {
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub passed: u32,
    #[serde(default)]
    pub failed: u32,
    #[serde(default)]
    pub errors: u32,
    #[serde(default)]
    pub success_rate: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BundleResult {
    #[serde(default)]
    pub bundle_name: Option<String>,
    #[serde(default)]
    pub summary: BundleSummary,
    #[serde(default)]
    /// `None` when the backend sent no `results` array at all.
    pub results: Option<Vec<TestRunResult>>,
}

// ─────────────────────────────────────────────────────────
// Request bodies
// ─────────────────────────────────────────────────────────

/// Body of `POST /api/v1/ideas`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdeaDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset: Option<String>,
    pub chain: String,
    pub budget: f64,
    #[serde(default)]
    pub description: String,
}

/// Body of `POST /api/v1/ideas/generate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub asset: String,
    pub chain: String,
    pub amount: f64,
    pub risk: i64,
}

impl Default for GenerateRequest {
    fn default() -> Self {
        Self {
            asset: "SOL".to_string(),
            chain: "solana".to_string(),
            amount: 0.1,
            risk: 3,
        }
    }
}

/// Body of `POST /api/v1/tests/run`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestRequest {
    pub test_type: String,
    pub test_name: String,
    #[serde(default)]
    pub parameters: Map<String, Value>,
}

// ─────────────────────────────────────────────────────────
// Decoding helpers
// ─────────────────────────────────────────────────────────

/// Decode a list response.
///
/// Accepts a bare JSON array, `{"items": [...]}`, or the array under any of
/// `keys` (e.g. `{"ideas": [...]}`). Any other shape is treated as empty.
pub fn decode_list<T: DeserializeOwned>(body: Value, keys: &[&str]) -> Result<Vec<T>> {
    let list = match body {
        Value::Array(items) => Value::Array(items),
        Value::Object(mut map) => std::iter::once("items")
            .chain(keys.iter().copied())
            .find_map(|key| match map.remove(key) {
                Some(v @ Value::Array(_)) => Some(v),
                _ => None,
            })
            .unwrap_or_else(|| Value::Array(Vec::new())),
        _ => Value::Array(Vec::new()),
    };
    Ok(serde_json::from_value(list)?)
}

/// Render a loose JSON scalar for display (`123.45`, `"abc"` → `abc`).
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn id_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}

/// `null` reads as the type's default, like an absent key.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn idea_state_round_trips_known_and_unknown() {
        assert_eq!(IdeaState::from("NEW".to_string()), IdeaState::New);
        assert_eq!(
            IdeaState::from("NEEDS_REVIEW".to_string()),
            IdeaState::NeedsReview
        );
        assert_eq!(
            IdeaState::from("DONE".to_string()),
            IdeaState::Other("DONE".to_string())
        );
        assert_eq!(IdeaState::Other("DONE".to_string()).as_str(), "DONE");
    }

    #[test]
    fn idea_accepts_status_alias_and_numeric_id() {
        let idea: Idea = serde_json::from_value(json!({
            "id": 7,
            "asset": "SOL",
            "budget": 12.5,
            "status": "NEW",
            "type": "Momentum"
        }))
        .unwrap();
        assert_eq!(idea.id, "7");
        assert_eq!(idea.state, IdeaState::New);
        assert_eq!(idea.budget_or_amount(), Some(12.5));
        assert!(idea.chain.is_none());
    }

    #[test]
    fn analyzed_idea_prefers_state_over_status() {
        let ideas: Vec<Idea> = decode_list(
            json!([{
                "id": "idea_00001",
                "type": "Momentum",
                "asset": "SOL",
                "risk": 3,
                "status": "ANALYZED",
                "state": "NEEDS_REVIEW",
                "score": 0.71
            }]),
            &["ideas"],
        )
        .unwrap();
        assert_eq!(ideas.len(), 1);
        assert_eq!(ideas[0].state, IdeaState::NeedsReview);
    }

    #[test]
    fn legacy_bare_array_uses_status() {
        let ideas: Vec<Idea> = decode_list(
            json!([
                { "id": "idea_00001", "asset": "SOL", "status": "NEW" },
                { "id": "idea_00002", "asset": "ETH", "status": "ANALYZED" }
            ]),
            &["ideas"],
        )
        .unwrap();
        assert_eq!(ideas[0].state, IdeaState::New);
        assert_eq!(ideas[1].state, IdeaState::Analyzed);

        let orders: Vec<Order> =
            decode_list(json!([{ "id": "o1", "status": "EXECUTING" }]), &["orders"]).unwrap();
        assert_eq!(orders[0].state, OrderState::Executing);
    }

    #[test]
    fn null_fields_fall_back_to_placeholders() {
        let ideas: Vec<Idea> = decode_list(
            json!([
                { "id": "i1", "state": null, "asset": null },
                { "id": "i2", "state": "NEW" }
            ]),
            &[],
        )
        .unwrap();
        assert_eq!(ideas.len(), 2);
        assert_eq!(ideas[0].state, IdeaState::default());
        assert_eq!(ideas[1].state, IdeaState::New);

        let orders: Vec<Order> =
            decode_list(json!([{ "id": "o1", "state": null, "status": null }]), &[]).unwrap();
        assert_eq!(orders[0].state, OrderState::default());

        let history: Vec<HistoryEntry> = decode_list(
            json!([{ "ts": null, "actor": null, "event": "IDEA_NEW", "ref": null }]),
            &["history"],
        )
        .unwrap();
        assert_eq!(history[0].ts, "");
        assert_eq!(history[0].actor, "");
        assert_eq!(history[0].event, "IDEA_NEW");

        let run: TestRunResult =
            serde_json::from_value(json!({ "output": null, "success": false })).unwrap();
        assert_eq!(run.output, "");
    }

    #[test]
    fn order_without_state_gets_empty_other() {
        let order: Order = serde_json::from_value(json!({ "id": "ord_1" })).unwrap();
        assert_eq!(order.state, OrderState::Other(String::new()));
    }

    #[test]
    fn history_entry_reads_ref_field() {
        let entry: HistoryEntry = serde_json::from_value(json!({
            "ts": "2025-09-16T20:06:17",
            "actor": "Forschung",
            "event": "IDEA_NEW",
            "ref": "idea_1234"
        }))
        .unwrap();
        assert_eq!(entry.reference.as_deref(), Some("idea_1234"));
    }

    #[test]
    fn decode_list_accepts_all_envelopes() {
        let items: Vec<Idea> =
            decode_list(json!({ "items": [{ "id": "a" }] }), &["ideas"]).unwrap();
        assert_eq!(items.len(), 1);

        let keyed: Vec<Idea> =
            decode_list(json!({ "ideas": [{ "id": "a" }, { "id": "b" }] }), &["ideas"]).unwrap();
        assert_eq!(keyed.len(), 2);

        let bare: Vec<Order> = decode_list(json!([{ "id": "o1" }]), &["orders"]).unwrap();
        assert_eq!(bare[0].id, "o1");

        let empty: Vec<Order> = decode_list(json!({}), &["orders"]).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn decode_list_reports_bad_records() {
        let result: Result<Vec<Idea>> = decode_list(json!({ "items": [{ "id": true }] }), &[]);
        assert!(result.is_err());
    }

    #[test]
    fn bundle_result_tolerates_missing_summary() {
        let bundle: BundleResult = serde_json::from_value(json!({ "results": [] })).unwrap();
        assert_eq!(bundle.summary, BundleSummary::default());
    }

    #[test]
    fn display_value_unquotes_strings() {
        assert_eq!(display_value(&json!(123.45)), "123.45");
        assert_eq!(display_value(&json!("1.5 SOL")), "1.5 SOL");
        assert_eq!(display_value(&Value::Null), "");
    }
}
