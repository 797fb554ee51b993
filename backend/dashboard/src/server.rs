//! Axum handlers for the dashboard page, its fragments, and user actions.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::actions::{Action, ActionForm, Outcome};
use crate::banner::ERROR_PREFIX;
use crate::dashboard::Dashboard;
use crate::errors::DashboardError;
use crate::page;
use crate::render::{self, escape, PLACEHOLDER};

#[derive(Clone)]
pub struct ApiState {
    pub dashboard: Arc<Dashboard>,
    pub poll_interval_secs: u64,
}

// ─────────────────────────────────────────────────────────
// Response shapes
// ─────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct ActionResponse {
    pub ok: bool,
    #[serde(flatten)]
    pub outcome: Outcome,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn lines<T>(items: &[T], line: fn(&T) -> String) -> Vec<String> {
    items.iter().map(line).collect()
}

fn error_response(err: &DashboardError) -> Response {
    let status = match err {
        DashboardError::UnknownAction(_) => StatusCode::NOT_FOUND,
        DashboardError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        DashboardError::Api { .. } | DashboardError::Http(_) | DashboardError::Json(_) => {
            StatusCode::BAD_GATEWAY
        }
        DashboardError::Database(_) | DashboardError::Migrate(_) | DashboardError::Config(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (
        status,
        Json(ErrorResponse {
            error: format!("{ERROR_PREFIX}{}", err.banner_message()),
        }),
    )
        .into_response()
}

pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/fragments/:panel", get(fragment))
        .route("/actions/:trigger", post(action))
        .route("/reports/:id", get(report))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ─────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────

/// `GET /`
pub async fn index(State(state): State<Arc<ApiState>>) -> impl IntoResponse {
    let snapshot = state.dashboard.snapshot().await;
    Html(page::dashboard_page(&snapshot, state.poll_interval_secs))
}

/// `GET /health`
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `GET /fragments/:panel`
///
/// Returns the inner HTML of one panel, rendered from the current snapshot.
pub async fn fragment(
    State(state): State<Arc<ApiState>>,
    Path(panel): Path<String>,
) -> Response {
    let snapshot = state.dashboard.snapshot().await;
    let text = |value: Option<&str>| escape(value.unwrap_or(PLACEHOLDER));

    let html = match panel.as_str() {
        "ideas" => render::render_ideas_table(&snapshot.ideas),
        "orders" => render::render_orders_table(&snapshot.orders),
        "ideas_list" => render::render_list(&lines(&snapshot.ideas, render::idea_line)),
        "orders_list" => render::render_list(&lines(&snapshot.orders, render::order_line)),
        "history" => render::render_history(&snapshot.history),
        "reports" => render::render_reports_list(&snapshot.reports),
        "banner" => render::render_banner(&snapshot.banner),
        "balance" => text(snapshot.balance.as_deref()),
        "report_content" => text(snapshot.report_content.as_deref()),
        "test_log" => text(snapshot.test_log.as_deref()),
        other => {
            return (StatusCode::NOT_FOUND, format!("Unknown panel: {other}")).into_response()
        }
    };
    Html(html).into_response()
}

/// `POST /actions/:trigger`
///
/// Resolves the trigger, runs the action and reports which panels changed.
pub async fn action(
    State(state): State<Arc<ApiState>>,
    Path(trigger): Path<String>,
    Form(form): Form<ActionForm>,
) -> Response {
    let action = match Action::from_trigger(&trigger, &form) {
        Ok(action) => action,
        Err(e) => {
            warn!("Rejected action '{trigger}': {e}");
            let response = error_response(&e);
            // Rejected input is still shown in the banner.
            let _ = state.dashboard.track::<()>(Err(e)).await;
            return response;
        }
    };

    match state.dashboard.dispatch(action).await {
        Ok(outcome) => Json(ActionResponse { ok: true, outcome }).into_response(),
        Err(e) => {
            warn!("Action '{trigger}' failed: {e}");
            error_response(&e)
        }
    }
}

/// `GET /reports/:id`
pub async fn report(State(state): State<Arc<ApiState>>, Path(id): Path<i64>) -> Response {
    let Some(store) = state.dashboard.store() else {
        return (StatusCode::NOT_FOUND, "Report persistence is disabled").into_response();
    };

    match store.get(id).await {
        Ok(Some(report)) => (
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            report.full_report,
        )
            .into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, format!("Report {id} not found")).into_response(),
        Err(e) => error_response(&e),
    }
}
