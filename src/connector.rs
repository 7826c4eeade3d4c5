use anyhow::{bail, Context};
use log::debug;
use reqwest::{blocking::Client, redirect};
use std::io::Read;

use crate::{
    config::FetchConfig,
    http::{RawResponse, Target},
};

/// Redirect hops followed before the exchange is given up as a fault.
pub const MAX_REDIRECTS: usize = 10;

/// Acquires a connection for a single fetch.
///
/// The connection is owned by the call that opened it and released when it is
/// dropped, so implementations should free their resources in `Drop`.
pub trait Connector {
    type Conn: Connection;

    fn connect(&self, target: &Target, config: &FetchConfig) -> anyhow::Result<Self::Conn>;
}

/// Performs one GET exchange on an open connection.
pub trait Connection {
    fn get(&mut self, target: &Target, config: &FetchConfig) -> anyhow::Result<RawResponse>;
}

/// `Connector` backed by a blocking `reqwest` client.
///
/// Every `connect` builds a fresh client from the `FetchConfig`, with idle
/// pooling turned off, so nothing outlives the `HttpConnection` it returns.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpConnector {}

impl HttpConnector {
    pub fn new() -> Self {
        Self {}
    }
}

impl Connector for HttpConnector {
    type Conn = HttpConnection;

    fn connect(&self, target: &Target, config: &FetchConfig) -> anyhow::Result<HttpConnection> {
        match target.scheme() {
            "http" | "https" => {}
            other => bail!("unsupported scheme: {}", other),
        }

        let client = Client::builder()
            .connect_timeout(config.connect_timeout_duration())
            .timeout(config.request_timeout_duration())
            .user_agent(config.user_agent.as_str())
            .redirect(redirect_policy(config))
            .pool_max_idle_per_host(0)
            .build()
            .context("could not build http client")?;

        debug!("HttpConnector::connect - client ready for {}", target);
        Ok(HttpConnection { client })
    }
}

/// Follows up to `MAX_REDIRECTS` hops and refuses any hop whose scheme the
/// config disallows.
fn redirect_policy(config: &FetchConfig) -> redirect::Policy {
    let config = config.clone();

    redirect::Policy::custom(move |attempt| {
        let scheme = attempt.url().scheme().to_string();
        if config.is_disallowed(&scheme) {
            attempt.error(format!("redirect to disallowed scheme: {}", scheme))
        } else if attempt.previous().len() > MAX_REDIRECTS {
            attempt.error(format!("more than {} redirects", MAX_REDIRECTS))
        } else {
            debug!("redirect_policy - following to {}", attempt.url());
            attempt.follow()
        }
    })
}

/// Open client produced by `HttpConnector`. Released on drop.
pub struct HttpConnection {
    client: Client,
}

impl Connection for HttpConnection {
    fn get(&mut self, target: &Target, config: &FetchConfig) -> anyhow::Result<RawResponse> {
        let response = self.client.get(target.to_string()).send()?;

        let status = response.status().as_u16();
        debug!(
            "HttpConnection::get - status: {}, final url: {}",
            status,
            response.url()
        );

        let body = read_body(response, config.max_body_bytes)?;
        Ok(RawResponse::new(status, body))
    }
}

impl Drop for HttpConnection {
    fn drop(&mut self) {
        debug!("HttpConnection::drop - client released");
    }
}

/// Reads a whole body as UTF-8, failing once more than `max` bytes arrive.
fn read_body<R: Read>(reader: R, max: Option<usize>) -> anyhow::Result<String> {
    let mut body = Vec::new();

    match max {
        Some(max) => {
            let limit = u64::try_from(max).unwrap_or(u64::MAX).saturating_add(1);
            reader
                .take(limit)
                .read_to_end(&mut body)
                .context("could not read response body")?;
            if body.len() > max {
                bail!("response body exceeds {} bytes", max);
            }
        }
        None => {
            let mut reader = reader;
            reader
                .read_to_end(&mut body)
                .context("could not read response body")?;
        }
    }

    String::from_utf8(body).context("response body is not valid utf-8")
}
