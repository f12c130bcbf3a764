//! State module for tracking crawl progress
//!
//! `CrawlPhase` is the run-level state machine driven by the crawler: the
//! search page fetch, link extraction, then one fetch/extract pair per
//! repository result.

mod crawl_phase;

pub use crawl_phase::CrawlPhase;
