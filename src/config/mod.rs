//! Configuration module for gh-crawler
//!
//! This module handles loading and validating the search options file and
//! the crawler's runtime settings.
//!
//! # Example
//!
//! ```no_run
//! use gh_crawler::config::load_search_options;
//! use std::path::Path;
//!
//! let options = load_search_options(Path::new("search.json")).unwrap();
//! println!("Crawler will search for: {}", options.query_term());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Category, CrawlerSettings, DetailFailurePolicy, RawSearchOptions, SearchOptions,
    DEFAULT_ORIGIN, DEFAULT_TIMEOUT_MS,
};

// Re-export parser functions
pub use parser::{load_search_options, parse_search_options, InputFormat};
pub use validation::{validate_search_options, validate_settings};
