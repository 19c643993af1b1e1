//! Client Configuration

use serde::{Deserialize, Serialize};

use crate::error::{GateError, Result};
use crate::route::{FAILURE_PATH, SUCCESS_PATH};

/// Where the client lives and how it reaches the backend
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Scheme + host (+ port) the app is served from
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Prefix for backend API requests; empty means same origin
    #[serde(default)]
    pub api_base: String,

    /// Path the gateway redirects to after a completed payment
    #[serde(default = "default_success_path")]
    pub success_path: String,

    /// Path the gateway redirects to after a cancelled payment
    #[serde(default = "default_failure_path")]
    pub failure_path: String,
}

fn default_origin() -> String {
    "http://localhost:3000".into()
}
fn default_success_path() -> String {
    SUCCESS_PATH.into()
}
fn default_failure_path() -> String {
    FAILURE_PATH.into()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            api_base: String::new(),
            success_path: default_success_path(),
            failure_path: default_failure_path(),
        }
    }
}

impl ClientConfig {
    /// Build from `PAYGATE_ORIGIN` / `PAYGATE_API_BASE` as resolved by
    /// `lookup`, falling back to defaults for anything unset or blank.
    ///
    /// Browsers have no process environment, so the caller decides where the
    /// variables come from (build-time values, a test table, ...).
    pub fn from_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        Self {
            origin: var("PAYGATE_ORIGIN").unwrap_or_else(default_origin),
            api_base: var("PAYGATE_API_BASE").unwrap_or_default(),
            ..Default::default()
        }
    }

    /// Same config served from a different origin
    pub fn with_origin(self, origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            ..self
        }
    }

    /// Origin without a trailing slash, rejected if it has no scheme
    pub fn normalized_origin(&self) -> Result<&str> {
        let origin = self.origin.trim_end_matches('/');
        if origin.starts_with("http://") || origin.starts_with("https://") {
            Ok(origin)
        } else {
            Err(GateError::Config(format!("origin {:?} has no http(s) scheme", self.origin)))
        }
    }

    /// Absolute URL for an API path
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.api_base.trim_end_matches('/'), path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.success_path, "/payment-success");
        assert_eq!(config.failure_path, "/payment-failure");
        assert_eq!(config.api_url("/api/profile"), "/api/profile");
    }

    #[test]
    fn test_partial_deserialize_uses_defaults() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"origin":"https://app.example"}"#).unwrap();
        assert_eq!(config.origin, "https://app.example");
        assert_eq!(config.success_path, "/payment-success");
        assert!(config.api_base.is_empty());
    }

    #[test]
    fn test_normalized_origin() {
        let config = ClientConfig::default().with_origin("https://app.example/");
        assert_eq!(config.normalized_origin().unwrap(), "https://app.example");

        let config = ClientConfig::default().with_origin("app.example");
        assert!(matches!(config.normalized_origin(), Err(GateError::Config(_))));
    }

    #[test]
    fn test_from_vars() {
        let config = ClientConfig::from_vars(|key| match key {
            "PAYGATE_ORIGIN" => Some("https://app.example".into()),
            "PAYGATE_API_BASE" => Some("  ".into()),
            _ => None,
        });
        assert_eq!(config.origin, "https://app.example");
        assert!(config.api_base.is_empty());
        assert_eq!(config.success_path, "/payment-success");

        assert_eq!(ClientConfig::from_vars(|_| None), ClientConfig::default());
    }

    #[test]
    fn test_api_url_with_base() {
        let config = ClientConfig {
            api_base: "https://api.example/".into(),
            ..Default::default()
        };
        assert_eq!(config.api_url("/api/checkout"), "https://api.example/api/checkout");
    }
}
