//! User actions: the mapping from a clicked trigger to the API call it makes,
//! and the panels re-rendered afterwards.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::dashboard::Dashboard;
use crate::errors::{DashboardError, Result};
use crate::models::{display_value, GenerateRequest, IdeaDraft};
use crate::render;
use crate::test_links::TestLink;

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    RunSystem,
    FetchBalance,
    LatestReport,
    CreateIdea(IdeaDraft),
    GenerateIdea(GenerateRequest),
    MoveToAnalysis(String),
    ScheduleIdea(String),
    ExecuteOrder(String),
    RunTestLink(TestLink),
    RunTestCase(String),
    RunBundle,
    RunAudit,
    Refresh,
}

/// Fields a trigger may carry. Form posts deliver everything as text, so
/// numbers are parsed here rather than by the extractor.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActionForm {
    pub id: Option<String>,
    pub asset: Option<String>,
    pub chain: Option<String>,
    pub budget: Option<String>,
    pub amount: Option<String>,
    pub risk: Option<String>,
    pub description: Option<String>,
    pub name: Option<String>,
    pub test_type: Option<String>,
    pub case: Option<String>,
}

impl ActionForm {
    fn text(value: &Option<String>) -> Option<&str> {
        value.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    fn required_id(&self, trigger: &str) -> Result<String> {
        Self::text(&self.id)
            .map(String::from)
            .ok_or_else(|| DashboardError::InvalidInput(format!("'{trigger}' needs an id")))
    }

    fn number<T: std::str::FromStr>(value: &Option<String>, field: &str) -> Result<Option<T>> {
        Self::text(value)
            .map(|raw| {
                raw.parse::<T>()
                    .map_err(|_| DashboardError::InvalidInput(format!("Invalid {field}: {raw}")))
            })
            .transpose()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Panel {
    Ideas,
    Orders,
    History,
    Reports,
    Balance,
    ReportContent,
    TestLog,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Outcome {
    /// User-visible text produced by the action, if any
    pub message: Option<String>,
    pub refreshed: Vec<Panel>,
}

impl Outcome {
    fn panels(refreshed: &[Panel]) -> Self {
        Self {
            message: None,
            refreshed: refreshed.to_vec(),
        }
    }

    fn with_message(message: String, refreshed: &[Panel]) -> Self {
        Self {
            message: Some(message),
            refreshed: refreshed.to_vec(),
        }
    }
}

impl Action {
    /// Resolve a trigger identifier (element id or `data-action`) to an action.
    pub fn from_trigger(trigger: &str, form: &ActionForm) -> Result<Self> {
        let action = match trigger {
            "btn-system" => Self::RunSystem,
            "btn-balance" => Self::FetchBalance,
            "btn-last-report" => Self::LatestReport,
            "btn-idea" => Self::CreateIdea(idea_draft(form)?),
            "btn-generate" => Self::GenerateIdea(generate_request(form)?),
            "btn-bundle-test" => Self::RunBundle,
            "btn-audit" => Self::RunAudit,
            "to-analysis" => Self::MoveToAnalysis(form.required_id(trigger)?),
            "schedule" => Self::ScheduleIdea(form.required_id(trigger)?),
            "execute" => Self::ExecuteOrder(form.required_id(trigger)?),
            "test-case" => Self::RunTestCase(
                ActionForm::text(&form.case)
                    .map(String::from)
                    .ok_or_else(|| DashboardError::InvalidInput("'test-case' needs a case".to_string()))?,
            ),
            "test-link" => Self::RunTestLink(TestLink {
                name: ActionForm::text(&form.name)
                    .map(String::from)
                    .ok_or_else(|| DashboardError::InvalidInput("'test-link' needs a name".to_string()))?,
                test_type: ActionForm::text(&form.test_type).map(String::from),
            }),
            "refresh" => Self::Refresh,
            other => return Err(DashboardError::UnknownAction(other.to_string())),
        };
        Ok(action)
    }

    pub fn trigger(&self) -> &'static str {
        match self {
            Self::RunSystem => "btn-system",
            Self::FetchBalance => "btn-balance",
            Self::LatestReport => "btn-last-report",
            Self::CreateIdea(_) => "btn-idea",
            Self::GenerateIdea(_) => "btn-generate",
            Self::RunBundle => "btn-bundle-test",
            Self::RunAudit => "btn-audit",
            Self::MoveToAnalysis(_) => "to-analysis",
            Self::ScheduleIdea(_) => "schedule",
            Self::ExecuteOrder(_) => "execute",
            Self::RunTestCase(_) => "test-case",
            Self::RunTestLink(_) => "test-link",
            Self::Refresh => "refresh",
        }
    }
}

fn idea_draft(form: &ActionForm) -> Result<IdeaDraft> {
    let missing = || DashboardError::InvalidInput("Bitte Chain und Budget angeben".to_string());

    let chain = ActionForm::text(&form.chain).ok_or_else(missing)?;
    let budget: f64 = ActionForm::number(&form.budget, "budget")?.ok_or_else(missing)?;
    if budget.is_nan() || budget <= 0.0 {
        return Err(missing());
    }

    Ok(IdeaDraft {
        asset: ActionForm::text(&form.asset).map(String::from),
        chain: chain.to_string(),
        budget,
        description: ActionForm::text(&form.description)
            .unwrap_or_default()
            .to_string(),
    })
}

fn generate_request(form: &ActionForm) -> Result<GenerateRequest> {
    let defaults = GenerateRequest::default();
    Ok(GenerateRequest {
        asset: ActionForm::text(&form.asset).map_or(defaults.asset, String::from),
        chain: ActionForm::text(&form.chain).map_or(defaults.chain, String::from),
        amount: ActionForm::number(&form.amount, "amount")?.unwrap_or(defaults.amount),
        risk: ActionForm::number(&form.risk, "risk")?.unwrap_or(defaults.risk),
    })
}

impl Dashboard {
    /// Run an action, re-render the panels it touches, and record the
    /// outcome in the banner.
    pub async fn dispatch(&self, action: Action) -> Result<Outcome> {
        info!("Dispatching {}", action.trigger());
        let result = self.perform(action).await;
        self.track(result).await
    }

    async fn perform(&self, action: Action) -> Result<Outcome> {
        use Panel::*;

        match action {
            Action::RunSystem => {
                let run = self.api.run_system().await?;
                if let Err(e) = self.refresh_lists().await {
                    warn!("List refresh after system run failed: {e}");
                }
                let text = render::system_run_text(&run);
                self.snapshot.write().await.report_content = Some(text.clone());
                Ok(Outcome::with_message(
                    text,
                    &[Ideas, Orders, History, ReportContent],
                ))
            }
            Action::FetchBalance => {
                let balance = display_value(&self.api.wallet_balance().await?.balance);
                self.snapshot.write().await.balance = Some(balance.clone());
                Ok(Outcome::with_message(balance, &[Balance]))
            }
            Action::LatestReport => {
                let text = render::latest_report_text(&self.api.latest_report().await?);
                self.snapshot.write().await.report_content = Some(text.clone());
                Ok(Outcome::with_message(text, &[ReportContent]))
            }
            Action::CreateIdea(draft) => {
                let idea = self.api.create_idea(&draft).await?;
                info!("Created idea {}", idea.id);
                reloaded("ideas", self.refresh_ideas().await);
                Ok(Outcome::panels(&[Ideas]))
            }
            Action::GenerateIdea(request) => {
                let idea = self.api.generate_idea(&request).await?;
                info!("Generated idea {}", idea.id);
                reloaded("ideas", self.refresh_ideas().await);
                reloaded("history", self.refresh_history().await);
                Ok(Outcome::panels(&[Ideas, History]))
            }
            Action::MoveToAnalysis(id) => {
                self.api.move_to_analysis(&id).await?;
                reloaded("ideas", self.refresh_ideas().await);
                Ok(Outcome::panels(&[Ideas]))
            }
            Action::ScheduleIdea(id) => {
                self.api.schedule_idea(&id).await?;
                reloaded("ideas", self.refresh_ideas().await);
                reloaded("orders", self.refresh_orders().await);
                Ok(Outcome::panels(&[Ideas, Orders]))
            }
            Action::ExecuteOrder(id) => {
                self.api.execute_order(&id).await?;
                reloaded("orders", self.refresh_orders().await);
                Ok(Outcome::panels(&[Orders]))
            }
            Action::RunTestLink(link) => {
                let outcome = self.test_links.run(&link).await;
                self.snapshot.write().await.test_log = Some(outcome.message.clone());
                let mut panels = vec![TestLog];
                if outcome.saved_id.is_some() {
                    reloaded("reports", self.refresh_reports().await);
                    panels.push(Reports);
                }
                Ok(Outcome::with_message(outcome.message, &panels))
            }
            Action::RunTestCase(case) => {
                let result = self.api.run_test_case(&case).await?;
                let text = if result.success {
                    format!(
                        "Test {case} erfolgreich: {}",
                        result.message.as_deref().unwrap_or(&result.output)
                    )
                } else {
                    format!(
                        "Test {case} fehlgeschlagen: {}",
                        result.error.as_deref().unwrap_or_default()
                    )
                };
                self.snapshot.write().await.test_log = Some(text.clone());
                Ok(Outcome::with_message(text, &[TestLog]))
            }
            Action::RunBundle => {
                let bundle = self.api.run_bundle(Method::GET).await?;
                let text = format!(
                    "Bundle-Test abgeschlossen: {}/{} erfolgreich",
                    bundle.summary.passed, bundle.summary.total
                );
                self.snapshot.write().await.test_log = Some(text.clone());
                Ok(Outcome::with_message(text, &[TestLog]))
            }
            Action::RunAudit => {
                let audit = self.api.run_audit().await?;
                let text = match audit.report_path {
                    Some(path) => format!("Audit abgeschlossen - Bericht gespeichert: {path}"),
                    None => "Audit abgeschlossen - Bericht wurde in reports/ gespeichert".to_string(),
                };
                self.snapshot.write().await.report_content = Some(text.clone());
                Ok(Outcome::with_message(text, &[ReportContent]))
            }
            Action::Refresh => {
                self.refresh_lists().await?;
                Ok(Outcome::panels(&[Ideas, Orders, History, Reports]))
            }
        }
    }
}

/// A list reload after a completed backend call. Failures are only logged:
/// the call itself went through and must not be reported as failed.
fn reloaded(list: &str, result: Result<()>) {
    if let Err(e) = result {
        warn!("Reloading {list} after action failed: {e}");
    }
}
