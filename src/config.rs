// src/config.rs
// =============================================================================
// Settings for the extraction pipeline.
//
// Defaults work against public github.com without a token. The binary fills
// these in from command-line flags (which themselves fall back to env vars);
// library callers can use from_env() or build the struct directly.
// =============================================================================

use std::env;
use std::time::Duration;

use crate::extract::DEFAULT_CONCURRENCY;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Root of the GitHub REST API
    pub api_base_url: String,
    /// Optional bearer token, raises the rate limit
    pub token: Option<String>,
    /// Maximum key-file requests in flight
    pub concurrency: usize,
    /// Timeout for any single HTTP request
    pub request_timeout: Duration,
    /// Deadline for resolving the tree and fetching every key file
    pub deadline: Duration,
    /// Literal paths added on top of the default key files
    pub extra_patterns: Vec<String>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            token: None,
            concurrency: DEFAULT_CONCURRENCY,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            deadline: DEFAULT_DEADLINE,
            extra_patterns: Vec::new(),
        }
    }
}

impl ExtractorConfig {
    // Reads GITHUB_TOKEN and GITHUB_API_URL, defaults for everything else
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    // Same as from_env, but asks `lookup` for each variable
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let mut config = Self::default();
        if let Some(url) = non_empty("GITHUB_API_URL") {
            config.api_base_url = url;
        }
        config.token = non_empty("GITHUB_TOKEN");
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = ExtractorConfig::default();
        assert_eq!(config.api_base_url, "https://api.github.com");
        assert!(config.token.is_none());
        assert_eq!(config.concurrency, DEFAULT_CONCURRENCY);
        assert!(config.deadline > config.request_timeout);
    }

    #[test]
    fn test_lookup_overrides_api_url_and_token() {
        let vars = HashMap::from([
            ("GITHUB_API_URL", "https://ghe.example.com/api/v3"),
            ("GITHUB_TOKEN", "ghp_example"),
        ]);

        let config = ExtractorConfig::from_lookup(|name| vars.get(name).map(|v| v.to_string()));
        assert_eq!(config.api_base_url, "https://ghe.example.com/api/v3");
        assert_eq!(config.token.as_deref(), Some("ghp_example"));
        assert_eq!(config.concurrency, DEFAULT_CONCURRENCY);
    }

    #[test]
    fn test_lookup_ignores_blank_values() {
        let vars = HashMap::from([("GITHUB_API_URL", ""), ("GITHUB_TOKEN", "   ")]);

        let config = ExtractorConfig::from_lookup(|name| vars.get(name).map(|v| v.to_string()));
        assert_eq!(config.api_base_url, DEFAULT_API_URL);
        assert!(config.token.is_none());
    }
}
