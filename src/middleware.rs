use log::debug;

use crate::{http::Target, outcome::PageOutcome};

/// Hooks run around every fetch, in registration order.
pub trait Middleware: Send + Sync {
    /// Runs after the url passed validation, before a connection is opened.
    /// Returning an error aborts the fetch with a `FailureException`.
    fn on_request(&self, _target: &Target) -> anyhow::Result<()> {
        Ok(())
    }

    /// Runs on every outcome, including the ones produced before any I/O.
    fn on_outcome(&self, _outcome: &PageOutcome) {}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LogMiddleware {}

impl Middleware for LogMiddleware {
    fn on_request(&self, target: &Target) -> anyhow::Result<()> {
        debug!("LogMiddleware::on_request - target: {}", target);
        Ok(())
    }

    fn on_outcome(&self, outcome: &PageOutcome) {
        debug!("LogMiddleware::on_outcome - outcome: {:?}", outcome);
    }
}
