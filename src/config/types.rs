use crate::config::validation::validate_search_options;
use crate::ConfigResult;
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::time::Duration;

/// Default origin for search queries and relative result links
pub const DEFAULT_ORIGIN: &str = "https://github.com";

/// Default per-request timeout in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Content category searched for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Category {
    #[default]
    Repositories,
    Wikis,
    Issues,
}

impl Category {
    /// Normalizes a raw `type` value into a category
    ///
    /// Only the exact, capitalized names are recognized. Anything else,
    /// including lowercase spellings and non-string values, falls back to
    /// `Repositories`, which is also what GitHub does for unknown types.
    pub fn from_type_value(value: &serde_json::Value) -> Self {
        match value.as_str() {
            Some("Wikis") => Self::Wikis,
            Some("Issues") => Self::Issues,
            _ => Self::Repositories,
        }
    }

    /// The name used in the search URL's `type` parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Repositories => "Repositories",
            Self::Wikis => "Wikis",
            Self::Issues => "Issues",
        }
    }

    /// Returns true if results of this category are enriched from their detail page
    pub fn has_detail_pages(&self) -> bool {
        matches!(self, Self::Repositories)
    }

    /// Returns all categories
    pub fn all() -> [Self; 3] {
        [Self::Repositories, Self::Wikis, Self::Issues]
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated search request. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOptions {
    keywords: Vec<String>,
    category: Category,
    proxies: Vec<String>,
}

impl SearchOptions {
    /// Builds validated search options from their individual values
    ///
    /// `kind` is the raw `type` value and is normalized with
    /// [`Category::from_type_value`].
    pub fn new(
        keywords: Vec<String>,
        kind: impl Into<serde_json::Value>,
        proxies: Vec<String>,
    ) -> ConfigResult<Self> {
        validate_search_options(RawSearchOptions {
            keywords: Some(keywords),
            proxies: Some(proxies),
            kind: Some(kind.into()),
        })
    }

    pub(crate) fn from_parts(keywords: Vec<String>, category: Category, proxies: Vec<String>) -> Self {
        Self {
            keywords,
            category,
            proxies,
        }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn proxies(&self) -> &[String] {
        &self.proxies
    }

    /// Keywords joined with `+`, as used in the `q` parameter
    pub fn query_term(&self) -> String {
        self.keywords.join("+")
    }
}

/// Search options as read from the input file, before validation
///
/// Every key is optional here so that a missing key can be reported as a
/// configuration error instead of a parse error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSearchOptions {
    #[serde(default)]
    pub keywords: Option<Vec<String>>,

    #[serde(default)]
    pub proxies: Option<Vec<String>>,

    /// Any value is accepted; only the key's presence is required
    #[serde(rename = "type", default, deserialize_with = "deserialize_present")]
    pub kind: Option<serde_json::Value>,
}

/// Maps a present key to `Some`, even when its value is `null`
fn deserialize_present<'de, D>(deserializer: D) -> Result<Option<serde_json::Value>, D::Error>
where
    D: Deserializer<'de>,
{
    serde_json::Value::deserialize(deserializer).map(Some)
}

/// What to do when a repository's detail page answers with an HTTP error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DetailFailurePolicy {
    /// Abort the whole crawl
    #[default]
    Abort,
    /// Keep the base record without `extra` and continue
    Skip,
}

/// Runtime behavior of the crawler
#[derive(Debug, Clone)]
pub struct CrawlerSettings {
    /// Timeout applied to every request
    pub timeout: Duration,

    /// Origin used for the search URL and for resolving relative links
    pub origin: String,

    /// Handling of HTTP errors on repository detail pages
    pub detail_failures: DetailFailurePolicy,

    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl Default for CrawlerSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            origin: DEFAULT_ORIGIN.to_string(),
            detail_failures: DetailFailurePolicy::default(),
            user_agent: format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
        }
    }
}
