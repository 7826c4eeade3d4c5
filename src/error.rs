use thiserror::Error;

use crate::outcome::Variant;

/// Returned by `Outcome::unwrap` when the outcome is not a success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("called unwrap on {found} outcome, expected Success")]
pub struct WrongVariantError {
    found: Variant,
}

impl WrongVariantError {
    pub fn new(found: Variant) -> Self {
        Self { found }
    }

    /// Variant the outcome actually held.
    pub fn found(&self) -> Variant {
        self.found
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not parse fetch config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("user agent must not be empty")]
    EmptyUserAgent,
}
