//! Shared data models for the YouView backend.
//!
//! This crate provides Serde-serializable types for:
//! - Videos, privacy levels and upload metadata
//! - Users, subscriptions, comments and reactions
//! - Playlists
//! - Keyset pages and cursors
//! - Home feed shelves
//! - Media encoding constants and AI summary placeholders

pub mod clock;
pub mod encoding;
pub mod engagement;
pub mod feed;
pub mod page;
pub mod playlist;
pub mod summary;
pub mod timestamp;
pub mod user;
pub mod video;

// Re-export common types
pub use clock::{Clock, ManualClock, SystemClock};
pub use engagement::{
    Comment, CommentView, HistoryItem, NewComment, Reaction, ReactionCounts, ReactionStatus,
    ReactionTarget, Subscription, WatchHistoryEntry,
};
pub use feed::{
    feed_page_cache_key, HomeFeed, Shelf, ShelfKind, FEED_PAGE_TTL_SECS, LIST_PAGE_SIZE,
    SHELF_CANDIDATE_LIMIT, SHELF_SIZE, TRENDING_CACHE_KEY, TRENDING_TTL_SECS,
    VIDEO_GRID_PAGE_SIZE,
};
pub use page::{parse_cursor, Keyed, Page, PageRequest};
pub use playlist::{Playlist, PlaylistDetails, PlaylistEntry, PlaylistMembership};
pub use timestamp::format_duration;
pub use user::{ProfileUpdate, User};
pub use video::{
    LikedVideo, NewVideo, Privacy, UploadId, Video, VideoCard, VideoEdit, VideoId,
    MAX_TITLE_LEN,
};
