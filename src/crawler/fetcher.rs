//! HTTP fetcher implementation
//!
//! This module issues single GET requests through a proxy and classifies the
//! outcome:
//! - success status → page markup
//! - timeout → soft outcome, no markup
//! - any other status → `CrawlError::HttpStatus`
//! - any other transport failure → `CrawlError::Transport`
//!
//! Each fetch builds its own client, so nothing is pooled between requests.

use crate::CrawlError;
use reqwest::{Client, Proxy};
use std::time::Duration;
use url::Url;

/// Result of a fetch that did not fail hard
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The page body
    Page(String),

    /// The request exceeded its timeout
    TimedOut,
}

impl FetchOutcome {
    /// Returns the page body, or `None` for a timeout
    pub fn page(self) -> Option<String> {
        match self {
            Self::Page(body) => Some(body),
            Self::TimedOut => None,
        }
    }
}

/// Builds an HTTP client, routing plain-HTTP traffic through `proxy` if given
///
/// Only the `http` scheme is proxied. HTTPS targets are requested directly.
///
/// # Arguments
///
/// * `proxy` - Proxy address in `ip[:port]` form, or `None` for a direct client
/// * `timeout` - Total timeout for a request
/// * `user_agent` - User-Agent header value
///
/// # Example
///
/// ```no_run
/// use gh_crawler::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client(Some("13.81.217.201:80"), Duration::from_secs(10), "gh-crawler/0.1").unwrap();
/// ```
pub fn build_http_client(
    proxy: Option<&str>,
    timeout: Duration,
    user_agent: &str,
) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .gzip(true)
        .brotli(true);

    if let Some(proxy) = proxy {
        builder = builder.proxy(Proxy::http(format!("http://{}", proxy))?);
    }

    builder.build()
}

/// Returns the proxy a request to `url` goes through
///
/// The proxy only covers plain HTTP, so for any other scheme it is never
/// parsed and a bad address cannot fail the request.
fn proxy_for<'a>(url: &Url, proxy: &'a str) -> Option<&'a str> {
    if url.scheme() == "http" {
        Some(proxy)
    } else {
        tracing::debug!("Not proxying {} request to {}", url.scheme(), url);
        None
    }
}

/// Fetches a URL through the given proxy
///
/// # Arguments
///
/// * `url` - The URL to fetch
/// * `proxy` - Proxy address in `ip[:port]` form
/// * `timeout` - Total timeout for the request
/// * `user_agent` - User-Agent header value
///
/// # Returns
///
/// * `Ok(FetchOutcome::Page)` - Success status and a readable body
/// * `Ok(FetchOutcome::TimedOut)` - The request or body read timed out
/// * `Err(CrawlError::HttpStatus)` - Non-success status
/// * `Err(CrawlError::Transport)` - Malformed URL, connection failure, or a
///   malformed proxy on a plain-HTTP request
pub async fn fetch_page(
    url: &str,
    proxy: &str,
    timeout: Duration,
    user_agent: &str,
) -> Result<FetchOutcome, CrawlError> {
    let target = Url::parse(url).map_err(|e| CrawlError::Transport {
        url: url.to_string(),
        message: e.to_string(),
    })?;

    let client = build_http_client(proxy_for(&target, proxy), timeout, user_agent)
        .map_err(|e| transport_error(url, &e))?;

    let response = match client.get(target).send().await {
        Ok(response) => response,
        Err(e) => return classify_error(url, e),
    };

    let status = response.status();
    if !status.is_success() {
        tracing::error!("Request to {} failed with status code {}", url, status.as_u16());
        return Err(CrawlError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    match response.text().await {
        Ok(body) => Ok(FetchOutcome::Page(body)),
        Err(e) => classify_error(url, e),
    }
}

/// Splits reqwest errors into the soft timeout outcome and hard transport errors
fn classify_error(url: &str, error: reqwest::Error) -> Result<FetchOutcome, CrawlError> {
    if error.is_timeout() {
        tracing::warn!("Url request timeout: {}", url);
        Ok(FetchOutcome::TimedOut)
    } else {
        Err(transport_error(url, &error))
    }
}

fn transport_error(url: &str, error: &reqwest::Error) -> CrawlError {
    let message = if error.is_connect() {
        format!("connection failed: {}", error)
    } else {
        error.to_string()
    };

    CrawlError::Transport {
        url: url.to_string(),
        message,
    }
}
