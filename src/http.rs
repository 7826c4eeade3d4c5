use hyper::{StatusCode, Uri};
use std::fmt::{self, Display};

use crate::outcome::{Outcome, PageOutcome};

/// Structured reason a page was not fetched.
///
/// These are reported results, not faults: the server answered with a non-2xx
/// status, or the request was refused before any I/O took place. It does not
/// implement `std::error::Error`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PageFailure {
    /// The server responded with a status outside 200-299.
    Status(u16),

    /// No URL was given, or it was blank.
    MissingUrl,

    /// The URL could not be parsed far enough to inspect scheme and host.
    InvalidUrl { url: String, reason: String },

    /// The URL uses a scheme refused by `FetchConfig::disallowed_schemes`.
    DisallowedScheme(String),
}

impl PageFailure {
    /// Status code for `PageFailure::Status`, `None` for failures raised before
    /// the request was sent.
    pub fn status(&self) -> Option<u16> {
        match *self {
            PageFailure::Status(code) => Some(code),
            PageFailure::MissingUrl
            | PageFailure::InvalidUrl { .. }
            | PageFailure::DisallowedScheme(_) => None,
        }
    }
}

impl Display for PageFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageFailure::Status(code) => {
                let reason = StatusCode::from_u16(*code)
                    .ok()
                    .and_then(|s| s.canonical_reason());
                match reason {
                    Some(reason) => write!(f, "server responded with {} {}", code, reason),
                    None => write!(f, "server responded with {}", code),
                }
            }
            PageFailure::MissingUrl => f.write_str("no url given"),
            PageFailure::InvalidUrl { url, reason } => {
                write!(f, "invalid url {:?}: {}", url, reason)
            }
            PageFailure::DisallowedScheme(scheme) => {
                write!(f, "scheme {:?} is not allowed", scheme)
            }
        }
    }
}

/// A URL that has a scheme and a host and can be handed to a `Connector`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Lowercased scheme, e.g. `https`.
    scheme: String,

    /// Lowercased host without port. IPv6 literals keep their brackets.
    host: String,

    /// Explicit port from the URL, if any.
    port: Option<u16>,

    /// Origin-form request target: path plus optional query, never empty.
    path: String,
}

impl Target {
    pub fn parse(url: &str) -> Result<Self, PageFailure> {
        let invalid = |reason: &str| PageFailure::InvalidUrl {
            url: url.to_string(),
            reason: reason.to_string(),
        };

        let uri = url
            .parse::<Uri>()
            .map_err(|e| invalid(&e.to_string()))?;

        let scheme = uri
            .scheme_str()
            .ok_or_else(|| invalid("missing scheme"))?
            .to_ascii_lowercase();
        let host = match uri.host() {
            Some(host) if !host.is_empty() => host.to_ascii_lowercase(),
            _ => return Err(invalid("missing host")),
        };
        let path = match uri.path_and_query().map(|pq| pq.as_str()) {
            Some(pq) if !pq.is_empty() => pq.to_string(),
            _ => "/".to_string(),
        };

        Ok(Self {
            scheme,
            host,
            port: uri.port_u16(),
            path,
        })
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Port to connect to: the explicit one, or the default of a known scheme.
    pub fn port(&self) -> Option<u16> {
        self.port.or(match self.scheme.as_str() {
            "http" => Some(80),
            "https" => Some(443),
            _ => None,
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Value of the `Host` header: the host, plus the port when it was given
    /// explicitly.
    pub fn authority(&self) -> String {
        match self.port {
            Some(port) => format!("{}:{}", self.host, port),
            None => self.host.clone(),
        }
    }
}

impl Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}{}", self.scheme, self.authority(), self.path)
    }
}

/// What the transport hands back after a completed exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }

    /// 2xx becomes `Success(body)`, anything else `FailureValue(Status(code))`.
    pub fn classify(self) -> PageOutcome {
        if self.is_success() {
            Outcome::success(self.body)
        } else {
            Outcome::failure_value(PageFailure::Status(self.status))
        }
    }
}
