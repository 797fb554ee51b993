//! Application configuration loaded from environment variables.

use std::str::FromStr;

use crate::errors::{DashboardError, Result};

/// Which path naming the trading API uses for idea transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteStyle {
    /// `/ideas/{id}/to-analysis` and `/ideas/{id}/schedule`
    Dashboard,
    /// `/ideas/{id}/analyze` and `/ideas/{id}/to_orders`
    Legacy,
}

impl RouteStyle {
    pub fn analysis_segment(self) -> &'static str {
        match self {
            Self::Dashboard => "to-analysis",
            Self::Legacy => "analyze",
        }
    }

    pub fn schedule_segment(self) -> &'static str {
        match self {
            Self::Dashboard => "schedule",
            Self::Legacy => "to_orders",
        }
    }
}

impl FromStr for RouteStyle {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dashboard" => Ok(Self::Dashboard),
            "legacy" => Ok(Self::Legacy),
            other => Err(DashboardError::Config(format!(
                "Invalid ROUTE_STYLE '{other}' (expected dashboard or legacy)"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the trading API (e.g. http://127.0.0.1:8000)
    pub api_base_url: String,
    /// Port the dashboard listens on
    pub listen_port: u16,
    /// How often (in seconds) to refresh ideas, orders and history
    pub poll_interval_secs: u64,
    /// Per-request timeout for calls to the trading API
    pub request_timeout_secs: u64,
    pub route_style: RouteStyle,
    /// SQLite URL for saved test reports; `None` disables persistence
    pub reports_database_url: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Missing keys take defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let api_base_url = get("API_BASE_URL", "http://127.0.0.1:8000")
            .trim_end_matches('/')
            .to_string();
        if api_base_url.is_empty() {
            return Err(DashboardError::Config("API_BASE_URL must not be empty".to_string()));
        }

        let poll_interval_secs: u64 = get("POLL_INTERVAL_SECS", "10")
            .parse()
            .map_err(|_| DashboardError::Config("Invalid POLL_INTERVAL_SECS".to_string()))?;
        if poll_interval_secs == 0 {
            return Err(DashboardError::Config(
                "POLL_INTERVAL_SECS must be at least 1".to_string(),
            ));
        }

        let reports_database_url = match lookup("REPORTS_DATABASE_URL") {
            Some(url) if url.trim().is_empty() => None,
            Some(url) => Some(url),
            None => Some("sqlite:./dashboard_reports.db".to_string()),
        };

        Ok(Config {
            api_base_url,
            listen_port: get("LISTEN_PORT", "3002")
                .parse()
                .map_err(|_| DashboardError::Config("Invalid LISTEN_PORT".to_string()))?,
            poll_interval_secs,
            request_timeout_secs: get("REQUEST_TIMEOUT_SECS", "30")
                .parse()
                .map_err(|_| DashboardError::Config("Invalid REQUEST_TIMEOUT_SECS".to_string()))?,
            route_style: get("ROUTE_STYLE", "dashboard").parse()?,
            reports_database_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.api_base_url, "http://127.0.0.1:8000");
        assert_eq!(config.listen_port, 3002);
        assert_eq!(config.poll_interval_secs, 10);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.route_style, RouteStyle::Dashboard);
        assert_eq!(
            config.reports_database_url.as_deref(),
            Some("sqlite:./dashboard_reports.db")
        );
    }

    #[test]
    fn trailing_slash_is_stripped_from_base_url() {
        let config = config_from(&[("API_BASE_URL", "http://backend:9000/")]).unwrap();
        assert_eq!(config.api_base_url, "http://backend:9000");
    }

    #[test]
    fn legacy_route_style() {
        let config = config_from(&[("ROUTE_STYLE", "Legacy")]).unwrap();
        assert_eq!(config.route_style, RouteStyle::Legacy);
        assert_eq!(config.route_style.analysis_segment(), "analyze");
        assert_eq!(config.route_style.schedule_segment(), "to_orders");
    }

    #[test]
    fn empty_reports_url_disables_persistence() {
        let config = config_from(&[("REPORTS_DATABASE_URL", "")]).unwrap();
        assert!(config.reports_database_url.is_none());
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            config_from(&[("LISTEN_PORT", "not-a-port")]),
            Err(DashboardError::Config(_))
        ));
        assert!(matches!(
            config_from(&[("POLL_INTERVAL_SECS", "0")]),
            Err(DashboardError::Config(_))
        ));
        assert!(matches!(
            config_from(&[("ROUTE_STYLE", "v3")]),
            Err(DashboardError::Config(_))
        ));
    }
}
