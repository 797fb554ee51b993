//! Application-wide error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashboardError {
    /// Network failure talking to the trading API (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Non-2xx response from the trading API.
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unknown action: {0}")]
    UnknownAction(String),
}

impl DashboardError {
    /// Text shown in the error banner after the `Fehler: ` prefix.
    pub fn banner_message(&self) -> String {
        match self {
            Self::Api { message, .. } => message.clone(),
            Self::InvalidInput(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
