//! gh-crawler: a targeted GitHub search crawler
//!
//! This crate queries GitHub's search result pages for one content category
//! (repositories, wikis or issues), extracts the result links, and for
//! repositories follows each link to collect the owner and language breakdown.
//! Every request is routed through a proxy picked at random from a caller
//! supplied list.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for crawl operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Empty proxy list provided")]
    EmptyProxyList,

    #[error("Proxy list has a non-well formed address: '{proxy}'")]
    MalformedProxy { proxy: String },

    #[error("HTTP status {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Transport error for {url}: {message}")]
    Transport { url: String, message: String },

    #[error("Invalid selector: {0}")]
    Selector(String),

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::CrawlPhase,
        to: state::CrawlPhase,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read input file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Key not found: '{0}'")]
    MissingKey(&'static str),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for crawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::{Category, CrawlerSettings, DetailFailurePolicy, SearchOptions};
pub use crawler::Crawler;
pub use output::{Extra, LanguageStats, ResultRecord};
pub use state::CrawlPhase;
