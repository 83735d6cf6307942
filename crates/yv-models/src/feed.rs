//! Home feed shapes and feed constants.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::page::Page;
use crate::video::VideoCard;

/// Main feed, channel and "my videos" page size
pub const VIDEO_GRID_PAGE_SIZE: usize = 12;
/// History, liked and search page size
pub const LIST_PAGE_SIZE: usize = 20;

/// Unwatched videos considered for the personalized shelf
pub const SHELF_CANDIDATE_LIMIT: usize = 30;
/// Videos shown on a shelf
pub const SHELF_SIZE: usize = 10;

pub const TRENDING_CACHE_KEY: &str = "feed:trending";
pub const TRENDING_TTL_SECS: u64 = 15 * 60;
pub const FEED_PAGE_TTL_SECS: u64 = 60;

/// Cache key of one main feed page.
pub fn feed_page_cache_key(cursor: Option<i64>) -> String {
    match cursor {
        Some(c) => format!("feed:page:{}", c),
        None => "feed:page:start".to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ShelfKind {
    /// Unwatched uploads from subscribed creators
    FreshFromCreators,
    /// Most discussed public videos
    Trending,
}

impl ShelfKind {
    pub fn title(&self) -> &'static str {
        match self {
            ShelfKind::FreshFromCreators => "Fresh from your Creators",
            ShelfKind::Trending => "Trending Now",
        }
    }
}

/// Horizontal strip above the main feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Shelf {
    pub kind: ShelfKind,
    pub title: String,
    pub videos: Vec<VideoCard>,
}

impl Shelf {
    pub fn new(kind: ShelfKind, videos: Vec<VideoCard>) -> Self {
        Self {
            kind,
            title: kind.title().to_string(),
            videos,
        }
    }
}

/// Home feed response. The shelf is only present on the first page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct HomeFeed {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shelf: Option<Shelf>,
    pub feed: Page<VideoCard>,
}
