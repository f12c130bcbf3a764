//! Repository detail page parser
//!
//! Extracts the repository owner and the language breakdown shown in the
//! repository sidebar.

use crate::crawler::parser::parse_selector;
use crate::output::LanguageStats;
use crate::CrawlError;
use scraper::{ElementRef, Html, Selector};

const AUTHOR_SELECTOR: &str = "span.author";
const PROFILE_LINK_SELECTOR: &str = "a.url.fn";
const LANGUAGE_ITEM_SELECTOR: &str = "ul.list-style-none > li";
const LANGUAGE_NAME_SELECTOR: &str = "span.color-fg-default.text-bold.mr-1";
const LANGUAGE_TEXT_SELECTOR: &str = "span";

/// Owner and language data found on a detail page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RepositoryDetails {
    pub owner: Option<String>,
    pub language_stats: LanguageStats,
}

/// A parsed repository detail page
pub struct DetailExtractor {
    document: Html,
    author: Selector,
    profile_link: Selector,
    language_item: Selector,
    language_name: Selector,
    language_text: Selector,
}

impl DetailExtractor {
    /// Parses the detail page markup
    pub fn new(markup: &str) -> Result<Self, CrawlError> {
        Ok(Self {
            document: Html::parse_document(markup),
            author: parse_selector(AUTHOR_SELECTOR)?,
            profile_link: parse_selector(PROFILE_LINK_SELECTOR)?,
            language_item: parse_selector(LANGUAGE_ITEM_SELECTOR)?,
            language_name: parse_selector(LANGUAGE_NAME_SELECTOR)?,
            language_text: parse_selector(LANGUAGE_TEXT_SELECTOR)?,
        })
    }

    /// Returns the repository owner's profile name
    ///
    /// Uses the first author block that contains a profile link. Newlines are
    /// removed and surrounding whitespace trimmed; an empty name is `None`.
    pub fn owner(&self) -> Option<String> {
        let link = self
            .document
            .select(&self.author)
            .find_map(|author| author.select(&self.profile_link).next())?;

        let owner = element_text(link).replace('\n', "").trim().to_string();
        (!owner.is_empty()).then_some(owner)
    }

    /// Returns language usage percentages keyed by language name
    ///
    /// Items without a name label or without a parsable `NN.N%` text are
    /// skipped. A repeated language name overwrites the earlier value.
    pub fn language_stats(&self) -> LanguageStats {
        let mut stats = LanguageStats::new();

        for item in self.document.select(&self.language_item) {
            let Some(label) = item.select(&self.language_name).next() else {
                continue;
            };
            let language = element_text(label).trim().to_string();

            let Some(text) = item
                .select(&self.language_text)
                .map(element_text)
                .find(|text| text.contains('%'))
            else {
                tracing::debug!("No usage percentage for language '{}'", language);
                continue;
            };

            match parse_percentage(&text) {
                Some(value) => {
                    stats.insert(language, value);
                }
                None => tracing::warn!(
                    "Dropping language '{}': unparsable percentage '{}'",
                    language,
                    text.trim()
                ),
            }
        }

        stats
    }

    /// Runs both extractions
    pub fn details(&self) -> RepositoryDetails {
        RepositoryDetails {
            owner: self.owner(),
            language_stats: self.language_stats(),
        }
    }
}

/// Extracts the owner from detail page markup
pub fn extract_owner(markup: &str) -> Result<Option<String>, CrawlError> {
    Ok(DetailExtractor::new(markup)?.owner())
}

/// Extracts the language breakdown from detail page markup
pub fn extract_language_stats(markup: &str) -> Result<LanguageStats, CrawlError> {
    Ok(DetailExtractor::new(markup)?.language_stats())
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect()
}

fn parse_percentage(text: &str) -> Option<f64> {
    text.replace('%', "").trim().parse().ok()
}
