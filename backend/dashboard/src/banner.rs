//! Page-level error banner.
//!
//! The API client never touches the banner; call sites pass their results
//! through [`Banner::track`] when a failure should be shown to the user.

use crate::errors::{DashboardError, Result};

pub const ERROR_PREFIX: &str = "Fehler: ";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Banner {
    message: Option<String>,
}

impl Banner {
    /// Clear on success, show `Fehler: <message>` on failure. The result is
    /// returned unchanged so the caller can still propagate it.
    pub fn track<T>(&mut self, result: Result<T>) -> Result<T> {
        match &result {
            Ok(_) => self.clear(),
            Err(e) => self.show(e),
        }
        result
    }

    pub fn show(&mut self, error: &DashboardError) {
        self.message = Some(format!("{ERROR_PREFIX}{}", error.banner_message()));
    }

    pub fn clear(&mut self) {
        self.message = None;
    }

    pub fn is_hidden(&self) -> bool {
        self.message.is_none()
    }

    pub fn text(&self) -> &str {
        self.message.as_deref().unwrap_or("")
    }
}
