//! Client configuration.
//!
//! Resolution order for the base URL: explicit `with_base_url`, then the
//! environment (a `.env` file is loaded first when present), then
//! `DEFAULT_BASE_URL`.

use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_PREFIX: &str = "api";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(8000);

/// Checked in order; the first non-blank value wins.
const BASE_URL_VARS: [&str; 4] = [
    "PHITHIAI_API_URL",
    "phithiai_API_URL",
    "NEXT_PUBLIC_PHITHIAI_API_URL",
    "NEXT_PUBLIC_phithiai_API_URL",
];
const TIMEOUT_VAR: &str = "PHITHIAI_API_TIMEOUT_MS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    base_url: String,
    prefix: String,
    timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            prefix: DEFAULT_PREFIX.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ApiConfig {
    pub fn new(base_url: &str) -> Self {
        Self::default().with_base_url(base_url)
    }

    /// Build from the process environment.
    ///
    /// An unparsable timeout is ignored with a warning rather than failing
    /// startup.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();

        let mut config = Self::default();
        if let Some(url) = base_url_from(|var| std::env::var(var).ok()) {
            config = config.with_base_url(&url);
        }
        if let Ok(raw) = std::env::var(TIMEOUT_VAR) {
            match raw.trim().parse::<u64>() {
                Ok(ms) => config = config.with_timeout(Duration::from_millis(ms)),
                Err(_) => tracing::warn!(value = %raw, "ignoring invalid {TIMEOUT_VAR}"),
            }
        }
        config
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = prefix.trim_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// `{base}/{prefix}/{path}` with at most one slash between segments.
    pub fn resolve(&self, path: &str) -> String {
        let path = path.strip_prefix('/').unwrap_or(path);
        if self.prefix.is_empty() {
            format!("{}/{path}", self.base_url)
        } else {
            format!("{}/{}/{path}", self.base_url, self.prefix)
        }
    }
}

fn base_url_from(lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    BASE_URL_VARS
        .iter()
        .find_map(|var| lookup(var).filter(|v| !v.trim().is_empty()))
}
