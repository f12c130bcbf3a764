//! Crawl phase definitions for tracking a run's progress
//!
//! A run moves through these phases strictly in order; detail phases repeat
//! once per repository result.

use std::fmt;

/// Represents the current phase of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CrawlPhase {
    /// Crawler built, `run()` not called yet
    #[default]
    Idle,

    /// Fetching the search results page
    FetchingSearchPage,

    /// Extracting result links from the search page
    ExtractingLinks,

    /// Fetching a repository detail page
    FetchingDetail,

    /// Extracting owner and languages from a detail page
    ExtractingDetail,

    // ===== Terminal States =====
    /// Run finished, results available
    Done,

    /// Run aborted by a hard failure
    Failed,
}

impl CrawlPhase {
    /// Returns true if the run is over
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Returns true if moving from `self` to `next` is allowed
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        use CrawlPhase::*;

        if next == Failed {
            return !self.is_terminal();
        }

        matches!(
            (self, next),
            (Idle, FetchingSearchPage)
                | (FetchingSearchPage, ExtractingLinks)
                | (FetchingSearchPage, Done)
                | (ExtractingLinks, FetchingDetail)
                | (ExtractingLinks, Done)
                | (FetchingDetail, ExtractingDetail)
                | (FetchingDetail, FetchingDetail)
                | (FetchingDetail, Done)
                | (ExtractingDetail, FetchingDetail)
                | (ExtractingDetail, Done)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::FetchingSearchPage => "fetching_search_page",
            Self::ExtractingLinks => "extracting_links",
            Self::FetchingDetail => "fetching_detail",
            Self::ExtractingDetail => "extracting_detail",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
