//! Proxy selection
//!
//! Every request goes through one proxy drawn uniformly at random from the
//! caller's list. A draw that lands on a malformed entry fails the call; no
//! other entry is tried.

use crate::CrawlError;
use rand::seq::SliceRandom;
use regex::Regex;
use std::sync::LazyLock;

/// `ip[:port]`, matched at the start of the candidate only
///
/// Octets are not range checked and trailing characters after a valid
/// address are accepted.
static PROXY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+(?:\.[0-9]+){3}(:[0-9]+)?").unwrap());

/// Picks a random proxy from the list and checks its format
///
/// # Returns
///
/// * `Ok(&str)` - The selected proxy address
/// * `Err(CrawlError::EmptyProxyList)` - The list is empty
/// * `Err(CrawlError::MalformedProxy)` - The drawn entry is not `ip[:port]`
pub fn pick_proxy(proxies: &[String]) -> Result<&str, CrawlError> {
    let proxy = proxies
        .choose(&mut rand::thread_rng())
        .ok_or(CrawlError::EmptyProxyList)?;

    if !is_valid_proxy_format(Some(proxy)) {
        return Err(CrawlError::MalformedProxy {
            proxy: proxy.clone(),
        });
    }

    tracing::debug!("Selected proxy: {}", proxy);
    Ok(proxy)
}

/// Checks whether a candidate looks like `ip[:port]`
///
/// Empty and absent candidates are never valid.
pub fn is_valid_proxy_format(candidate: Option<&str>) -> bool {
    match candidate {
        Some(proxy) if !proxy.is_empty() => PROXY_PATTERN.is_match(proxy),
        _ => false,
    }
}
