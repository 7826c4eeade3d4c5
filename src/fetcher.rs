use anyhow::Context;
use log::{debug, error, info, warn};

use crate::{
    config::FetchConfig,
    connector::{Connection, Connector, HttpConnector},
    error::ConfigError,
    http::{PageFailure, RawResponse, Target},
    middleware::Middleware,
    outcome::{Outcome, PageOutcome},
};

/// Fetches pages and reports every result as an `Outcome`.
///
/// `get_page` never panics and never returns an error: missing or refused
/// urls become `FailureValue`, non-2xx responses become
/// `FailureValue(PageFailure::Status(..))` and every transport fault becomes
/// `FailureException`.
///
/// ```no_run
/// use rfetch::{fetcher::Fetcher, outcome::Outcome};
///
/// let fetcher = Fetcher::new();
///
/// match fetcher.get_page(Some("https://www.example.com")) {
///     Outcome::Success(page) => println!("{}", page),
///     Outcome::FailureValue(fv) => println!("{}", fv.value()),
///     Outcome::FailureException(fe) => println!("{:#}", fe.cause()),
/// }
/// ```
pub struct Fetcher<C = HttpConnector> {
    connector: C,
    config: FetchConfig,

    /// Run on every fetch, see `Middleware`.
    middlewares: Vec<Box<dyn Middleware>>,
}

impl Fetcher<HttpConnector> {
    pub fn new() -> Self {
        Self::with_connector(HttpConnector::new())
    }
}

impl Default for Fetcher<HttpConnector> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Fetcher<C>
where
    C: Connector,
{
    pub fn with_connector(connector: C) -> Self {
        Self {
            connector,
            config: FetchConfig::default(),
            middlewares: Vec::new(),
        }
    }

    /// Replaces the config after checking it with `FetchConfig::validate`.
    pub fn config(mut self, config: FetchConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// Registers new middleware.
    pub fn middleware<M>(mut self, m: M) -> Self
    where
        M: Middleware + 'static,
    {
        self.middlewares.push(Box::new(m));
        self
    }

    pub fn fetch_config(&self) -> &FetchConfig {
        &self.config
    }

    /// GETs `url` and wraps the result in an `Outcome`.
    pub fn get_page(&self, url: Option<&str>) -> PageOutcome {
        let outcome = self.fetch(url);

        match &outcome {
            Outcome::Success(body) => info!("get_page - success, {} bytes", body.len()),
            Outcome::FailureValue(fv) => info!("get_page - failure: {}", fv.value()),
            Outcome::FailureException(fe) => info!("get_page - fault: {:#}", fe.cause()),
        }

        for m in &self.middlewares {
            m.on_outcome(&outcome);
        }

        outcome
    }

    fn fetch(&self, url: Option<&str>) -> PageOutcome {
        if let Some(index) = require_present(&[url]) {
            warn!("get_page - input {} is missing", index);
            return Outcome::failure_value(PageFailure::MissingUrl);
        }
        let url = url.unwrap_or_default().trim();

        let target = match Target::parse(url) {
            Ok(target) => target,
            Err(failure) => {
                warn!("get_page - refusing url: {}", failure);
                return Outcome::failure_value(failure);
            }
        };

        if self.config.is_disallowed(target.scheme()) {
            warn!("get_page - refusing {}: scheme is disallowed", target);
            return Outcome::failure_value(PageFailure::DisallowedScheme(
                target.scheme().to_string(),
            ));
        }

        match self.exchange(&target) {
            Ok(response) => response.classify(),
            Err(e) => {
                error!("get_page - fault while fetching {}: {:#}", target, e);
                Outcome::failure_exception(e)
            }
        }
    }

    /// Opens one connection, performs the GET and releases the connection
    /// before returning, whatever the result.
    fn exchange(&self, target: &Target) -> anyhow::Result<RawResponse> {
        for m in &self.middlewares {
            m.on_request(target)?;
        }

        debug!("exchange - GET {}", target);
        let mut conn = self
            .connector
            .connect(target, &self.config)
            .with_context(|| format!("could not connect to {}", target))?;

        let response = conn
            .get(target, &self.config)
            .with_context(|| format!("GET {} failed", target));
        drop(conn);

        response
    }
}

/// Returns the index of the first input that is absent or blank.
pub fn require_present(inputs: &[Option<&str>]) -> Option<usize> {
    inputs.iter().position(|input| match input {
        Some(s) => s.trim().is_empty(),
        None => true,
    })
}
