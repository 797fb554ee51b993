//! Persistence for saved test-link reports.
//!
//! Components that save reports receive an `Arc<dyn ReportStore>` explicitly;
//! a dashboard started without a store simply has none to pass.

use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

use crate::errors::Result;

/// A report produced by a test link, ready to be stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestReport {
    /// `bundle`, the link's test type, or `individual`
    pub kind: String,
    pub name: String,
    pub endpoint: String,
    pub method: String,
    /// HTTP status; `0` when the request never completed
    pub status: u16,
    pub response_time_ms: u64,
    pub success: bool,
    pub request_body: Option<String>,
    pub response: Option<Value>,
    pub error: Option<String>,
    /// Human-readable text produced by `format_test_report`
    pub full_report: String,
}

/// A report as stored in / read from the database.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct StoredReport {
    pub id: i64,
    pub kind: String,
    pub name: String,
    pub endpoint: String,
    pub method: String,
    pub status: i64,
    pub success: bool,
    pub response_time_ms: i64,
    pub full_report: String,
    pub created_at: i64,
}

#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Persist a report and return its id.
    async fn save(&self, report: &TestReport) -> Result<i64>;

    /// Most recent reports first.
    async fn list(&self, limit: i64) -> Result<Vec<StoredReport>>;

    async fn get(&self, id: i64) -> Result<Option<StoredReport>>;
}

/// Establish a SQLite connection pool and run pending migrations.
pub async fn init_pool(database_url: &str) -> Result<SqlitePool> {
    let url = if database_url.starts_with("sqlite:") {
        database_url.to_string()
    } else {
        format!("sqlite:{database_url}")
    };

    let options = SqliteConnectOptions::from_str(&url)?.create_if_missing(true);

    // Every connection to `:memory:` is its own database.
    let max_connections = if url.contains(":memory:") { 1 } else { 5 };

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Report database migrations applied successfully");
    Ok(pool)
}

#[derive(Debug, Clone)]
pub struct SqliteReportStore {
    pool: SqlitePool,
}

impl SqliteReportStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self> {
        Ok(Self::new(init_pool(database_url).await?))
    }
}

#[async_trait]
impl ReportStore for SqliteReportStore {
    async fn save(&self, report: &TestReport) -> Result<i64> {
        let response = report
            .response
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        let id = sqlx::query(
            r#"
            INSERT INTO test_reports
                (kind, name, endpoint, method, status, success, response_time_ms,
                 request_body, response, error, full_report, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&report.kind)
        .bind(&report.name)
        .bind(&report.endpoint)
        .bind(&report.method)
        .bind(i64::from(report.status))
        .bind(report.success)
        .bind(i64::try_from(report.response_time_ms).unwrap_or(i64::MAX))
        .bind(&report.request_body)
        .bind(response)
        .bind(&report.error)
        .bind(&report.full_report)
        .bind(chrono::Utc::now().timestamp())
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        Ok(id)
    }

    async fn list(&self, limit: i64) -> Result<Vec<StoredReport>> {
        let rows = sqlx::query_as::<_, StoredReport>(
            r#"
            SELECT id, kind, name, endpoint, method, status, success,
                   response_time_ms, full_report, created_at
            FROM   test_reports
            ORDER  BY created_at DESC, id DESC
            LIMIT  ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get(&self, id: i64) -> Result<Option<StoredReport>> {
        let row = sqlx::query_as::<_, StoredReport>(
            r#"
            SELECT id, kind, name, endpoint, method, status, success,
                   response_time_ms, full_report, created_at
            FROM   test_reports
            WHERE  id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}
