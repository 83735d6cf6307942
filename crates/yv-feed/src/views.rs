//! Paginated listing views.

use std::sync::Arc;

use tracing::debug;

use yv_models::{HistoryItem, LikedVideo, Page, PageRequest, VideoCard};
use yv_store::ListingRepo;

use crate::config::FeedConfig;
use crate::error::FeedResult;
use crate::pagination::fetch_page;

/// Split a search query into lowercase terms.
pub fn search_terms(query: &str) -> Vec<String> {
    query
        .split_whitespace()
        .map(|t| t.to_lowercase())
        .collect()
}

/// Every keyset-paginated listing, over any [`ListingRepo`].
pub struct Listings<S: ?Sized> {
    store: Arc<S>,
    config: FeedConfig,
}

impl<S: ?Sized> Clone for Listings<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: self.config.clone(),
        }
    }
}

impl<S> Listings<S>
where
    S: ListingRepo + ?Sized,
{
    pub fn new(store: Arc<S>, config: FeedConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    /// Public videos, newest first.
    pub async fn main_feed(&self, cursor: Option<i64>) -> FeedResult<Page<VideoCard>> {
        let request = PageRequest::after(cursor, self.config.grid_page_size);
        let page = fetch_page(request, |cursor, limit| {
            self.store.list_public_videos(cursor, limit)
        })
        .await?;
        Ok(page)
    }

    /// A channel's videos. Non-public ones only when the owner is looking.
    pub async fn channel_videos(
        &self,
        owner_id: &str,
        viewer_id: Option<&str>,
        cursor: Option<i64>,
    ) -> FeedResult<Page<VideoCard>> {
        let include_non_public = viewer_id == Some(owner_id);
        let request = PageRequest::after(cursor, self.config.grid_page_size);
        let page = fetch_page(request, |cursor, limit| {
            self.store
                .list_owner_videos(owner_id, include_non_public, cursor, limit)
        })
        .await?;
        Ok(page)
    }

    /// The viewer's own uploads, every privacy.
    pub async fn my_videos(
        &self,
        viewer_id: &str,
        cursor: Option<i64>,
    ) -> FeedResult<Page<VideoCard>> {
        self.channel_videos(viewer_id, Some(viewer_id), cursor).await
    }

    pub async fn history(
        &self,
        viewer_id: &str,
        cursor: Option<i64>,
    ) -> FeedResult<Page<HistoryItem>> {
        let request = PageRequest::after(cursor, self.config.list_page_size);
        let page = fetch_page(request, |cursor, limit| {
            self.store.list_history(viewer_id, cursor, limit)
        })
        .await?;
        Ok(page)
    }

    pub async fn liked(
        &self,
        viewer_id: &str,
        cursor: Option<i64>,
    ) -> FeedResult<Page<LikedVideo>> {
        let request = PageRequest::after(cursor, self.config.list_page_size);
        let page = fetch_page(request, |cursor, limit| {
            self.store.list_liked(viewer_id, cursor, limit)
        })
        .await?;
        Ok(page)
    }

    /// Public videos matching every term of `query`. A blank query finds
    /// nothing.
    pub async fn search(&self, query: &str, cursor: Option<i64>) -> FeedResult<Page<VideoCard>> {
        let terms = search_terms(query);
        if terms.is_empty() {
            return Ok(Page::empty());
        }
        debug!(terms = terms.len(), ?cursor, "Searching videos");

        let request = PageRequest::after(cursor, self.config.list_page_size);
        let page = fetch_page(request, |cursor, limit| {
            self.store.search_videos(&terms, cursor, limit)
        })
        .await?;
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_terms() {
        assert_eq!(search_terms("  Funny   CAT "), vec!["funny", "cat"]);
        assert!(search_terms(" \t ").is_empty());
    }
}
