//! Crawler module for search and detail page processing
//!
//! This module contains the core crawling logic, including:
//! - Random proxy selection
//! - HTTP fetching with soft timeouts
//! - Search result link extraction
//! - Repository detail extraction
//! - Overall crawl coordination

mod coordinator;
mod detail;
mod fetcher;
mod parser;
mod proxy;

pub use coordinator::{run_crawl, Crawler};
pub use detail::{extract_language_stats, extract_owner, DetailExtractor, RepositoryDetails};
pub use fetcher::{build_http_client, fetch_page, FetchOutcome};
pub use parser::{extract_links, rule_for, ExtractionRule, LinkExtractor, EXTRACTION_RULES};
pub use proxy::{is_valid_proxy_format, pick_proxy};

use crate::config::{load_search_options, CrawlerSettings};
use crate::output::ResultRecord;
use crate::CrawlError;
use std::path::Path;

/// Loads search options from `input` and runs a complete crawl
///
/// This is the main entry point used by the binary. It will:
/// 1. Load and validate the search options file
/// 2. Fetch the search results page through a random proxy
/// 3. Extract the result links for the category
/// 4. Enrich repository results from their detail pages
///
/// # Arguments
///
/// * `input` - Path to the search options file
/// * `settings` - Runtime settings (timeout, origin, detail failure policy)
///
/// # Returns
///
/// * `Ok(Vec<ResultRecord>)` - Results in document order
/// * `Err(CrawlError)` - Loading failed or the crawl hit a hard failure
pub async fn crawl(input: &Path, settings: CrawlerSettings) -> Result<Vec<ResultRecord>, CrawlError> {
    let options = load_search_options(input)?;
    run_crawl(options, settings).await
}
