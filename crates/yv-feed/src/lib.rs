//! Listing views and home feed assembly.
//!
//! Every listing goes through [`pagination::fetch_page`], which implements
//! the keyset contract shared with the store. [`FeedAssembler`] adds the
//! shelf and caching on top of the main feed.

pub mod config;
pub mod error;
pub mod feed;
pub mod pagination;
pub mod views;

pub use config::FeedConfig;
pub use error::{FeedError, FeedResult};
pub use feed::{select_diverse, FeedAssembler};
pub use pagination::fetch_page;
pub use views::{search_terms, Listings};
