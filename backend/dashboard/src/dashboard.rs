//! Shared dashboard state: the API client, the optional report store, and the
//! snapshot of whatever was fetched last.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use crate::api_client::ApiClient;
use crate::banner::Banner;
use crate::errors::Result;
use crate::models::{HistoryEntry, Idea, Order};
use crate::reports::{ReportStore, StoredReport};
use crate::test_links::TestLinkHandler;

/// How many stored reports the reports panel shows.
pub const REPORTS_PANEL_LIMIT: i64 = 20;

/// The latest fetch result for every panel. Each refresh replaces the
/// affected fields wholesale.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub ideas: Vec<Idea>,
    pub orders: Vec<Order>,
    pub history: Vec<HistoryEntry>,
    pub reports: Vec<StoredReport>,
    pub banner: Banner,
    pub balance: Option<String>,
    /// System run output or the latest backend report
    pub report_content: Option<String>,
    pub test_log: Option<String>,
    pub refreshed_at: Option<DateTime<Utc>>,
}

pub struct Dashboard {
    pub(crate) api: ApiClient,
    pub(crate) test_links: TestLinkHandler,
    pub(crate) store: Option<Arc<dyn ReportStore>>,
    pub(crate) snapshot: RwLock<Snapshot>,
}

impl Dashboard {
    pub fn new(api: ApiClient, store: Option<Arc<dyn ReportStore>>) -> Self {
        Self {
            test_links: TestLinkHandler::new(api.clone(), store.clone()),
            api,
            store,
            snapshot: RwLock::new(Snapshot::default()),
        }
    }

    pub fn store(&self) -> Option<&Arc<dyn ReportStore>> {
        self.store.as_ref()
    }

    pub async fn snapshot(&self) -> Snapshot {
        self.snapshot.read().await.clone()
    }

    /// Pass `result` through the banner: cleared on success, shown on failure.
    pub async fn track<T>(&self, result: Result<T>) -> Result<T> {
        self.snapshot.write().await.banner.track(result)
    }

    /// Refresh every list and record the outcome in the banner.
    pub async fn refresh(&self) -> Result<()> {
        let result = self.refresh_lists().await;
        self.track(result).await
    }

    /// Fetch ideas, orders and history (and stored reports). Nothing is
    /// replaced unless every fetch succeeds.
    pub async fn refresh_lists(&self) -> Result<()> {
        let ideas = self.api.list_ideas().await?;
        let orders = self.api.list_orders().await?;
        let history = self.api.list_history().await?;
        let reports = self.load_reports().await?;

        debug!(
            "Refreshed {} ideas, {} orders, {} history entries",
            ideas.len(),
            orders.len(),
            history.len()
        );

        let mut snapshot = self.snapshot.write().await;
        snapshot.ideas = ideas;
        snapshot.orders = orders;
        snapshot.history = history;
        if let Some(reports) = reports {
            snapshot.reports = reports;
        }
        snapshot.refreshed_at = Some(Utc::now());
        Ok(())
    }

    pub(crate) async fn refresh_ideas(&self) -> Result<()> {
        let ideas = self.api.list_ideas().await?;
        self.snapshot.write().await.ideas = ideas;
        Ok(())
    }

    pub(crate) async fn refresh_orders(&self) -> Result<()> {
        let orders = self.api.list_orders().await?;
        self.snapshot.write().await.orders = orders;
        Ok(())
    }

    pub(crate) async fn refresh_history(&self) -> Result<()> {
        let history = self.api.list_history().await?;
        self.snapshot.write().await.history = history;
        Ok(())
    }

    pub(crate) async fn refresh_reports(&self) -> Result<()> {
        if let Some(reports) = self.load_reports().await? {
            self.snapshot.write().await.reports = reports;
        }
        Ok(())
    }

    async fn load_reports(&self) -> Result<Option<Vec<StoredReport>>> {
        match &self.store {
            Some(store) => Ok(Some(store.list(REPORTS_PANEL_LIMIT).await?)),
            None => Ok(None),
        }
    }
}
