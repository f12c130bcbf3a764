use crate::config::types::{RawSearchOptions, SearchOptions};
use crate::config::validation::validate_search_options;
use crate::ConfigError;
use std::path::Path;

/// Format of a search options file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Json,
    Toml,
}

impl InputFormat {
    /// Picks the format from the file extension, defaulting to JSON
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Self::Toml,
            _ => Self::Json,
        }
    }
}

/// Loads search options from the given path
///
/// # Arguments
///
/// * `path` - Path to a JSON (or `.toml`) file with `keywords`, `proxies` and `type`
///
/// # Returns
///
/// * `Ok(SearchOptions)` - Successfully loaded and validated options
/// * `Err(ConfigError)` - Failed to read, parse, or validate the file
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use gh_crawler::config::load_search_options;
///
/// let options = load_search_options(Path::new("search.json")).unwrap();
/// println!("Searching {} for {}", options.category(), options.query_term());
/// ```
pub fn load_search_options(path: &Path) -> Result<SearchOptions, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_search_options(&content, InputFormat::from_path(path))
}

/// Parses search options from a string in the given format
pub fn parse_search_options(
    content: &str,
    format: InputFormat,
) -> Result<SearchOptions, ConfigError> {
    let raw: RawSearchOptions = match format {
        InputFormat::Json => serde_json::from_str(content)?,
        InputFormat::Toml => toml::from_str(content)?,
    };

    validate_search_options(raw)
}
