//! Feed configuration.

use std::time::Duration;

use yv_models::{
    FEED_PAGE_TTL_SECS, LIST_PAGE_SIZE, SHELF_CANDIDATE_LIMIT, SHELF_SIZE, TRENDING_TTL_SECS,
    VIDEO_GRID_PAGE_SIZE,
};

#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Main feed, channel and "my videos" page size
    pub grid_page_size: usize,
    /// History, liked and search page size
    pub list_page_size: usize,
    pub shelf_candidates: usize,
    pub shelf_size: usize,
    pub trending_ttl: Duration,
    pub feed_page_ttl: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            grid_page_size: VIDEO_GRID_PAGE_SIZE,
            list_page_size: LIST_PAGE_SIZE,
            shelf_candidates: SHELF_CANDIDATE_LIMIT,
            shelf_size: SHELF_SIZE,
            trending_ttl: Duration::from_secs(TRENDING_TTL_SECS),
            feed_page_ttl: Duration::from_secs(FEED_PAGE_TTL_SECS),
        }
    }
}

impl FeedConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            grid_page_size: env_parse("FEED_GRID_PAGE_SIZE").unwrap_or(defaults.grid_page_size),
            list_page_size: env_parse("FEED_LIST_PAGE_SIZE").unwrap_or(defaults.list_page_size),
            shelf_candidates: env_parse("FEED_SHELF_CANDIDATES")
                .unwrap_or(defaults.shelf_candidates),
            shelf_size: env_parse("FEED_SHELF_SIZE").unwrap_or(defaults.shelf_size),
            trending_ttl: env_parse("FEED_TRENDING_TTL_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.trending_ttl),
            feed_page_ttl: env_parse("FEED_PAGE_TTL_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.feed_page_ttl),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}
