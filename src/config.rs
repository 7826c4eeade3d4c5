use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::ConfigError;

const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

/// Timeouts are capped at one day when handed to the transport.
const MAX_TIMEOUT_MS: u64 = 24 * 60 * 60 * 1000;

/// Body limit used unless the config says otherwise: 10 MiB.
pub const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Settings shared by every fetch made through a `Fetcher`.
///
/// ```rust
/// use rfetch::config::FetchConfig;
/// use std::time::Duration;
///
/// let config = FetchConfig::default()
///     .allow_scheme("http")
///     .connect_timeout(Duration::from_secs(2));
///
/// assert!(!config.is_disallowed("http"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Schemes refused before any I/O, compared case-insensitively.
    pub disallowed_schemes: Vec<String>,

    pub connect_timeout_ms: u64,

    /// Deadline for the whole exchange, redirects and body included.
    pub request_timeout_ms: u64,

    pub user_agent: String,

    /// Bodies larger than this are treated as a fault. `None` reads without
    /// bound.
    pub max_body_bytes: Option<usize>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            disallowed_schemes: vec!["http".to_string()],
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            user_agent: concat!("rfetch/", env!("CARGO_PKG_VERSION")).to_string(),
            max_body_bytes: Some(DEFAULT_MAX_BODY_BYTES),
        }
    }
}

impl FetchConfig {
    /// Parses a JSON document. Missing fields take their default value.
    pub fn from_json(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.connect_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout("connect_timeout_ms"));
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout("request_timeout_ms"));
        }
        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::EmptyUserAgent);
        }
        Ok(())
    }

    pub fn is_disallowed(&self, scheme: &str) -> bool {
        self.disallowed_schemes
            .iter()
            .any(|s| s.eq_ignore_ascii_case(scheme))
    }

    pub fn connect_timeout_duration(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms.min(MAX_TIMEOUT_MS))
    }

    pub fn request_timeout_duration(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms.min(MAX_TIMEOUT_MS))
    }

    /// Adds a scheme to the refused list.
    pub fn disallow_scheme(mut self, scheme: impl Into<String>) -> Self {
        let scheme = scheme.into();
        if !self.is_disallowed(&scheme) {
            self.disallowed_schemes.push(scheme);
        }
        self
    }

    /// Removes a scheme from the refused list.
    pub fn allow_scheme(mut self, scheme: &str) -> Self {
        self.disallowed_schemes
            .retain(|s| !s.eq_ignore_ascii_case(scheme));
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout_ms = saturating_millis(timeout);
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_ms = saturating_millis(timeout);
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn max_body_bytes(mut self, max: usize) -> Self {
        self.max_body_bytes = Some(max);
        self
    }

    /// Reads bodies of any size.
    pub fn unbounded_body(mut self) -> Self {
        self.max_body_bytes = None;
        self
    }
}

fn saturating_millis(timeout: Duration) -> u64 {
    u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX)
}
