//! Output module for crawl results
//!
//! This module handles:
//! - The result record types produced by a crawl
//! - Rendering results as pretty-printed JSON
//! - Writing results to a file

use crate::CrawlError;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::path::Path;

/// Language usage percentages in the order they appear on the page
///
/// Inserting a language that is already present replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LanguageStats {
    entries: Vec<(String, f64)>,
}

impl LanguageStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the percentage for a language, returning the previous value
    pub fn insert(&mut self, language: String, percentage: f64) -> Option<f64> {
        match self.entries.iter_mut().find(|(name, _)| *name == language) {
            Some((_, value)) => Some(std::mem::replace(value, percentage)),
            None => {
                self.entries.push((language, percentage));
                None
            }
        }
    }

    pub fn get(&self, language: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(name, _)| name == language)
            .map(|(_, value)| *value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), *value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, f64)> for LanguageStats {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        let mut stats = Self::new();
        for (language, percentage) in iter {
            stats.insert(language, percentage);
        }
        stats
    }
}

impl Serialize for LanguageStats {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (language, percentage) in &self.entries {
            map.serialize_entry(language, percentage)?;
        }
        map.end()
    }
}

/// Enrichment data for a repository result
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Extra {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_stats: Option<LanguageStats>,
}

impl Extra {
    /// Builds the extra block from whatever was found
    ///
    /// Returns `None` when neither an owner nor any language was found, so a
    /// record never carries an empty `extra`.
    pub fn from_parts(owner: Option<String>, language_stats: LanguageStats) -> Option<Self> {
        let language_stats = (!language_stats.is_empty()).then_some(language_stats);
        if owner.is_none() && language_stats.is_none() {
            return None;
        }

        Some(Self {
            owner,
            language_stats,
        })
    }
}

/// One crawl result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRecord {
    pub url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra: Option<Extra>,
}

impl ResultRecord {
    /// A record with only the result URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            extra: None,
        }
    }

    pub fn with_extra(mut self, extra: Option<Extra>) -> Self {
        self.extra = extra;
        self
    }
}

/// Renders results as JSON indented with four spaces
pub fn render_results(results: &[ResultRecord]) -> Result<String, CrawlError> {
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut buffer = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    results.serialize(&mut serializer)?;

    // serde_json only ever writes valid UTF-8
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Renders results and writes them to `path`, replacing any existing file
pub fn write_results(results: &[ResultRecord], path: &Path) -> Result<(), CrawlError> {
    let rendered = render_results(results)?;
    std::fs::write(path, rendered)?;
    tracing::info!("Results written to {}", path.display());
    Ok(())
}
