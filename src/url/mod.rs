//! URL handling module for gh-crawler
//!
//! This module builds search URLs and resolves the site-relative hrefs found
//! in result markup.

use crate::config::Category;
use url::Url;

/// Builds the search URL for a query term and category
///
/// The query term is substituted verbatim, so keywords must already be
/// joined with `+`.
///
/// # Examples
///
/// ```
/// use gh_crawler::config::Category;
/// use gh_crawler::url::build_search_url;
///
/// let url = build_search_url("https://github.com", "openstack+nova", Category::Wikis);
/// assert_eq!(url, "https://github.com/search?q=openstack+nova&type=Wikis");
/// ```
pub fn build_search_url(origin: &str, query_term: &str, category: Category) -> String {
    format!(
        "{}/search?q={}&type={}",
        origin.trim_end_matches('/'),
        query_term,
        category.as_str()
    )
}

/// Resolves a site-relative href against the origin
///
/// Returns `None` unless the href starts with `/`. Absolute URLs, fragments
/// and page-relative paths are not followed.
pub fn resolve_site_path(origin: &Url, href: &str) -> Option<String> {
    if !href.starts_with('/') {
        return None;
    }

    origin.join(href).ok().map(|url| url.to_string())
}
