//! Search result parser
//!
//! This module turns a search results page into the list of result links.
//! Each category has a fixed rule: a container selector matching one result
//! block, and a link selector matching the anchor inside that block.

use crate::config::Category;
use crate::url::resolve_site_path;
use crate::CrawlError;
use scraper::{Html, Selector};
use url::Url;

/// Selection rule for one category's result markup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionRule {
    pub category: Category,
    /// Matches each result block
    pub container: &'static str,
    /// Matches the anchor holding the result URL, scoped to a block
    pub link: &'static str,
}

/// Rules for every category, in `Category::all()` order
pub static EXTRACTION_RULES: [ExtractionRule; 3] = [
    ExtractionRule {
        category: Category::Repositories,
        container: "ul.repo-list > li",
        link: "a.v-align-middle[href]",
    },
    ExtractionRule {
        category: Category::Wikis,
        container: "div.hx_hit-wiki",
        link: "a.Link--muted.text-small.text-bold[href]",
    },
    ExtractionRule {
        category: Category::Issues,
        container: "div.issue-list-item",
        link: "a.Link--muted.text-bold[href]",
    },
];

/// Returns the extraction rule for a category
pub fn rule_for(category: Category) -> &'static ExtractionRule {
    match category {
        Category::Repositories => &EXTRACTION_RULES[0],
        Category::Wikis => &EXTRACTION_RULES[1],
        Category::Issues => &EXTRACTION_RULES[2],
    }
}

/// Parses a selector, mapping failures into `CrawlError::Selector`
pub(crate) fn parse_selector(pattern: &str) -> Result<Selector, CrawlError> {
    Selector::parse(pattern).map_err(|e| CrawlError::Selector(format!("{}: {:?}", pattern, e)))
}

/// A parsed results page with its selection rule
///
/// The document is parsed once; [`LinkExtractor::links`] can be called any
/// number of times and always yields the same sequence.
pub struct LinkExtractor {
    document: Html,
    container: Selector,
    link: Selector,
    origin: Url,
}

impl LinkExtractor {
    /// Parses `markup` and compiles the two selector patterns
    ///
    /// # Arguments
    ///
    /// * `markup` - The results page HTML
    /// * `container` - Selector for each result block
    /// * `link` - Selector for the anchor inside a block
    /// * `origin` - Origin that site-relative hrefs are resolved against
    pub fn new(markup: &str, container: &str, link: &str, origin: &Url) -> Result<Self, CrawlError> {
        Ok(Self {
            document: Html::parse_document(markup),
            container: parse_selector(container)?,
            link: parse_selector(link)?,
            origin: origin.clone(),
        })
    }

    /// Builds an extractor using a category's fixed rule
    pub fn for_category(markup: &str, category: Category, origin: &Url) -> Result<Self, CrawlError> {
        let rule = rule_for(category);
        Self::new(markup, rule.container, rule.link, origin)
    }

    /// Lazily yields absolute result URLs in document order
    ///
    /// Blocks without a matching anchor, or whose href is not site-relative,
    /// yield nothing.
    pub fn links(&self) -> impl Iterator<Item = String> + '_ {
        self.document.select(&self.container).filter_map(move |block| {
            let href = block.select(&self.link).next()?.value().attr("href")?;
            let url = resolve_site_path(&self.origin, href)?;
            tracing::debug!("{}", url);
            Some(url)
        })
    }
}

/// Convenience function for extracting all result links with a category's rule
///
/// # Example
///
/// ```
/// use gh_crawler::config::Category;
/// use gh_crawler::crawler::extract_links;
/// use url::Url;
///
/// let html = r#"<ul class="repo-list"><li><a class="v-align-middle" href="/rust-lang/rust">rust</a></li></ul>"#;
/// let origin = Url::parse("https://github.com").unwrap();
/// let links = extract_links(html, Category::Repositories, &origin).unwrap();
/// assert_eq!(links, vec!["https://github.com/rust-lang/rust".to_string()]);
/// ```
pub fn extract_links(
    markup: &str,
    category: Category,
    origin: &Url,
) -> Result<Vec<String>, CrawlError> {
    Ok(LinkExtractor::for_category(markup, category, origin)?
        .links()
        .collect())
}
