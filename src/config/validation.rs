use crate::config::types::{CrawlerSettings, RawSearchOptions, SearchOptions};
use crate::config::Category;
use crate::crawler::is_valid_proxy_format;
use crate::ConfigError;
use url::Url;

/// Checks required keys and builds validated search options
pub fn validate_search_options(raw: RawSearchOptions) -> Result<SearchOptions, ConfigError> {
    let keywords = raw.keywords.ok_or(ConfigError::MissingKey("keywords"))?;
    let proxies = raw.proxies.ok_or(ConfigError::MissingKey("proxies"))?;
    let kind = raw.kind.ok_or(ConfigError::MissingKey("type"))?;

    validate_keywords(&keywords)?;
    validate_proxies(&proxies)?;

    let category = Category::from_type_value(&kind);
    if kind.as_str() != Some(category.as_str()) {
        tracing::debug!("Unknown search type {}, using {}", kind, category);
    }

    Ok(SearchOptions::from_parts(keywords, category, proxies))
}

/// Validates crawler settings
pub fn validate_settings(settings: &CrawlerSettings) -> Result<(), ConfigError> {
    if settings.timeout.is_zero() {
        return Err(ConfigError::Validation(
            "timeout must be greater than zero".to_string(),
        ));
    }

    let origin = Url::parse(&settings.origin)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid origin '{}': {}", settings.origin, e)))?;

    if origin.scheme() != "http" && origin.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Origin '{}' must use HTTP or HTTPS",
            settings.origin
        )));
    }

    Ok(())
}

fn validate_keywords(keywords: &[String]) -> Result<(), ConfigError> {
    if keywords.is_empty() {
        return Err(ConfigError::Validation(
            "keywords cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Malformed entries are only reported here; drawing one fails the crawl later
fn validate_proxies(proxies: &[String]) -> Result<(), ConfigError> {
    if proxies.is_empty() {
        return Err(ConfigError::Validation(
            "proxies cannot be empty".to_string(),
        ));
    }

    for proxy in proxies.iter().filter(|p| !is_valid_proxy_format(Some(p.as_str()))) {
        tracing::warn!("Proxy '{}' is not in ip[:port] format", proxy);
    }

    Ok(())
}
