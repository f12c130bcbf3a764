//! Crawler coordinator - main crawl orchestration logic
//!
//! This module drives a single crawl run:
//! - Fetching the search results page through a random proxy
//! - Extracting result links with the category's rule
//! - For repositories, fetching each detail page and attaching owner and
//!   language data
//! - Collecting result records in document order
//!
//! Requests are issued one at a time. A hard failure at any point aborts the
//! run and discards every record collected so far.

use crate::config::{
    validate_settings, CrawlerSettings, DetailFailurePolicy, SearchOptions,
};
use crate::crawler::detail::DetailExtractor;
use crate::crawler::fetcher::{fetch_page, FetchOutcome};
use crate::crawler::parser::extract_links;
use crate::crawler::proxy::pick_proxy;
use crate::output::{Extra, ResultRecord};
use crate::state::CrawlPhase;
use crate::url::build_search_url;
use crate::{ConfigError, CrawlError};
use url::Url;

/// Main crawler structure
pub struct Crawler {
    options: SearchOptions,
    settings: CrawlerSettings,
    origin: Url,
    phase: CrawlPhase,
    results: Vec<ResultRecord>,
}

impl Crawler {
    /// Creates a crawler with default settings
    pub fn new(options: SearchOptions) -> Result<Self, CrawlError> {
        Self::with_settings(options, CrawlerSettings::default())
    }

    /// Creates a crawler with custom settings
    ///
    /// # Returns
    ///
    /// * `Ok(Crawler)` - Crawler in the `Idle` phase
    /// * `Err(CrawlError::Config)` - The settings are invalid
    pub fn with_settings(
        options: SearchOptions,
        settings: CrawlerSettings,
    ) -> Result<Self, CrawlError> {
        validate_settings(&settings)?;
        let origin = Url::parse(&settings.origin).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid origin '{}': {}", settings.origin, e))
        })?;

        Ok(Self {
            options,
            settings,
            origin,
            phase: CrawlPhase::Idle,
            results: Vec::new(),
        })
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    pub fn settings(&self) -> &CrawlerSettings {
        &self.settings
    }

    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    /// Results of the last successful run, in document order
    pub fn results(&self) -> &[ResultRecord] {
        &self.results
    }

    pub fn into_results(self) -> Vec<ResultRecord> {
        self.results
    }

    /// Returns the crawler to `Idle` and drops previous results
    pub fn reset(&mut self) {
        self.phase = CrawlPhase::Idle;
        self.results.clear();
    }

    /// Runs the crawl
    ///
    /// A timeout on the search page finishes the run with no results. Any
    /// hard failure moves the crawler to `Failed`, clears the results and is
    /// returned to the caller.
    ///
    /// # Errors
    ///
    /// * `CrawlError::InvalidTransition` - The crawler already ran; call [`Crawler::reset`] first
    /// * `CrawlError::EmptyProxyList` / `CrawlError::MalformedProxy` - Proxy selection failed
    /// * `CrawlError::HttpStatus` / `CrawlError::Transport` - A request failed
    pub async fn run(&mut self) -> Result<&[ResultRecord], CrawlError> {
        if self.phase != CrawlPhase::Idle {
            return Err(CrawlError::InvalidTransition {
                from: self.phase,
                to: CrawlPhase::FetchingSearchPage,
            });
        }

        match self.crawl().await {
            Ok(results) => {
                tracing::info!("Crawl completed with {} results", results.len());
                self.results = results;
                Ok(self.results.as_slice())
            }
            Err(e) => {
                tracing::error!("Crawl failed: {}", e);
                if !self.phase.is_terminal() {
                    self.phase = CrawlPhase::Failed;
                }
                self.results.clear();
                Err(e)
            }
        }
    }

    async fn crawl(&mut self) -> Result<Vec<ResultRecord>, CrawlError> {
        self.transition(CrawlPhase::FetchingSearchPage)?;

        let category = self.options.category();
        tracing::info!("Start crawling");
        tracing::debug!("keywords: {:?}", self.options.keywords());
        tracing::debug!("type: {}", category);

        let search_url = build_search_url(&self.settings.origin, &self.options.query_term(), category);
        tracing::info!("Get results from {}", search_url);

        let Some(markup) = self.fetch(&search_url).await?.page() else {
            tracing::warn!("{}, finishing with no results", timeout_error(&search_url));
            self.transition(CrawlPhase::Done)?;
            return Ok(Vec::new());
        };

        self.transition(CrawlPhase::ExtractingLinks)?;
        tracing::info!("Retrieve data from raw html");
        let links = extract_links(&markup, category, &self.origin)?;
        tracing::info!("Found {} {} results", links.len(), category);

        let mut results = Vec::with_capacity(links.len());
        for url in links {
            let extra = if category.has_detail_pages() {
                self.fetch_details(&url).await?
            } else {
                None
            };
            results.push(ResultRecord::new(url).with_extra(extra));
        }

        self.transition(CrawlPhase::Done)?;
        Ok(results)
    }

    /// Fetches a repository's detail page and builds its `extra` block
    ///
    /// Timeouts leave the record without `extra`. HTTP status errors do the
    /// same under `DetailFailurePolicy::Skip` and abort the run otherwise.
    async fn fetch_details(&mut self, url: &str) -> Result<Option<Extra>, CrawlError> {
        self.transition(CrawlPhase::FetchingDetail)?;
        tracing::info!("Get extra data from {}", url);

        let markup = match self.fetch(url).await {
            Ok(FetchOutcome::Page(markup)) => markup,
            Ok(FetchOutcome::TimedOut) => {
                tracing::warn!("{}, keeping record without extra data", timeout_error(url));
                return Ok(None);
            }
            Err(CrawlError::HttpStatus { status, .. })
                if self.settings.detail_failures == DetailFailurePolicy::Skip =>
            {
                tracing::warn!(
                    "Detail page {} returned status {}, keeping record without extra data",
                    url,
                    status
                );
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        self.transition(CrawlPhase::ExtractingDetail)?;
        let details = DetailExtractor::new(&markup)?.details();
        tracing::debug!(
            "owner: {:?}, languages: {}",
            details.owner,
            details.language_stats.len()
        );

        Ok(Extra::from_parts(details.owner, details.language_stats))
    }

    /// Fetches a URL through a freshly drawn proxy
    async fn fetch(&self, url: &str) -> Result<FetchOutcome, CrawlError> {
        tracing::info!("Get random proxy from given list");
        let proxy = pick_proxy(self.options.proxies())?;
        fetch_page(url, proxy, self.settings.timeout, &self.settings.user_agent).await
    }

    fn transition(&mut self, next: CrawlPhase) -> Result<(), CrawlError> {
        if !self.phase.can_transition_to(next) {
            return Err(CrawlError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }

        tracing::trace!("Crawl phase {} -> {}", self.phase, next);
        self.phase = next;
        Ok(())
    }
}

/// Soft timeouts are logged, not returned
fn timeout_error(url: &str) -> CrawlError {
    CrawlError::Timeout {
        url: url.to_string(),
    }
}

/// Runs a crawl with a fresh crawler and returns its results
///
/// # Example
///
/// ```no_run
/// use gh_crawler::config::{load_search_options, CrawlerSettings};
/// use gh_crawler::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let options = load_search_options(Path::new("search.json"))?;
/// let results = run_crawl(options, CrawlerSettings::default()).await?;
/// println!("{} results", results.len());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(
    options: SearchOptions,
    settings: CrawlerSettings,
) -> Result<Vec<ResultRecord>, CrawlError> {
    let mut crawler = Crawler::with_settings(options, settings)?;
    crawler.run().await?;
    Ok(crawler.into_results())
}
