//! Home feed assembly.
//!
//! The first page carries a shelf: unwatched uploads from subscribed
//! creators when the viewer has any, otherwise the cached trending list.
//! Main feed pages are read through a short-TTL cache.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use yv_cache::{Cache, CacheExt};
use yv_models::{feed_page_cache_key, HomeFeed, Page, Shelf, ShelfKind, VideoCard, TRENDING_CACHE_KEY};
use yv_store::ListingRepo;

use crate::config::FeedConfig;
use crate::error::FeedResult;
use crate::views::Listings;

/// Pick up to `limit` videos, preferring one per creator.
///
/// Pass one takes the first video of each creator in candidate order. Pass
/// two fills the remaining slots with the skipped candidates, still in
/// candidate order.
pub fn select_diverse(candidates: Vec<VideoCard>, limit: usize) -> Vec<VideoCard> {
    let mut creators = HashSet::new();
    let mut selected = Vec::with_capacity(limit);
    let mut skipped = Vec::new();

    for video in candidates {
        if selected.len() < limit && creators.insert(video.owner_id.clone()) {
            selected.push(video);
        } else {
            skipped.push(video);
        }
    }

    let room = limit.saturating_sub(selected.len());
    selected.extend(skipped.into_iter().take(room));
    selected
}

/// Builds the home feed for a viewer.
pub struct FeedAssembler<S: ?Sized, C: ?Sized> {
    store: Arc<S>,
    cache: Arc<C>,
    listings: Listings<S>,
    config: FeedConfig,
}

impl<S, C> FeedAssembler<S, C>
where
    S: ListingRepo + ?Sized,
    C: Cache + ?Sized,
{
    pub fn new(store: Arc<S>, cache: Arc<C>, config: FeedConfig) -> Self {
        Self {
            listings: Listings::new(Arc::clone(&store), config.clone()),
            store,
            cache,
            config,
        }
    }

    /// Shelf (first page only) plus one page of the main feed.
    pub async fn home(&self, viewer_id: Option<&str>, cursor: Option<i64>) -> FeedResult<HomeFeed> {
        let started = Instant::now();

        let shelf = match cursor {
            None => self.shelf(viewer_id).await?,
            Some(_) => None,
        };
        let feed = self.main_page(cursor).await?;

        metrics::histogram!("yv_feed_assembly_duration_seconds")
            .record(started.elapsed().as_secs_f64());
        debug!(
            shelf = ?shelf.as_ref().map(|s| s.kind),
            items = feed.items.len(),
            ?cursor,
            "Assembled home feed"
        );
        Ok(HomeFeed { shelf, feed })
    }

    /// Personalized shelf when possible, trending otherwise. `None` when
    /// both are empty.
    pub async fn shelf(&self, viewer_id: Option<&str>) -> FeedResult<Option<Shelf>> {
        if let Some(viewer_id) = viewer_id {
            let candidates = self
                .store
                .subscribed_unwatched(viewer_id, self.config.shelf_candidates)
                .await?;
            if !candidates.is_empty() {
                let videos = select_diverse(candidates, self.config.shelf_size);
                return Ok(Some(Shelf::new(ShelfKind::FreshFromCreators, videos)));
            }
        }

        let trending = self.trending().await?;
        if trending.is_empty() {
            return Ok(None);
        }
        Ok(Some(Shelf::new(ShelfKind::Trending, trending)))
    }

    /// Trending list, cached under one global key.
    pub async fn trending(&self) -> FeedResult<Vec<VideoCard>> {
        if let Some(cached) = self.cache.get_json::<Vec<VideoCard>>(TRENDING_CACHE_KEY).await {
            return Ok(cached);
        }

        let videos = self.store.trending(self.config.shelf_size).await?;
        if self
            .cache
            .set_json(TRENDING_CACHE_KEY, &videos, self.config.trending_ttl)
            .await
        {
            info!(count = videos.len(), "Refreshed trending cache");
        }
        Ok(videos)
    }

    /// One page of the public feed, read through the page cache.
    pub async fn main_page(&self, cursor: Option<i64>) -> FeedResult<Page<VideoCard>> {
        let key = feed_page_cache_key(cursor);
        if let Some(cached) = self.cache.get_json::<Page<VideoCard>>(&key).await {
            return Ok(cached);
        }

        let page = self.listings.main_feed(cursor).await?;
        self.cache
            .set_json(&key, &page, self.config.feed_page_ttl)
            .await;
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use yv_models::{Privacy, VideoId};

    fn card(id: i64, owner: &str) -> VideoCard {
        VideoCard {
            id: VideoId(id),
            owner_id: owner.to_string(),
            owner_name: owner.to_string(),
            title: format!("video {id}"),
            thumbnail_url: String::new(),
            preview_url: String::new(),
            duration: "00:00:01".to_string(),
            privacy: Privacy::Public,
            created_at: Utc::now(),
        }
    }

    fn ids(videos: &[VideoCard]) -> Vec<i64> {
        videos.iter().map(|v| v.id.get()).collect()
    }

    #[test]
    fn test_diversity_prefers_distinct_creators() {
        let candidates = vec![card(5, "A"), card(4, "A"), card(3, "A"), card(2, "B"), card(1, "C")];
        let shelf = select_diverse(candidates, 4);
        assert_eq!(ids(&shelf), vec![5, 2, 1, 4]);
    }

    #[test]
    fn test_diversity_fills_up_to_shelf_size() {
        let candidates = vec![card(5, "A"), card(4, "A"), card(3, "A"), card(2, "B"), card(1, "C")];
        let shelf = select_diverse(candidates, 10);
        assert_eq!(ids(&shelf), vec![5, 2, 1, 4, 3]);
    }

    #[test]
    fn test_diversity_limit_in_first_pass() {
        let candidates = vec![card(3, "A"), card(2, "B"), card(1, "C")];
        assert_eq!(ids(&select_diverse(candidates, 2)), vec![3, 2]);
    }

    #[test]
    fn test_diversity_single_creator_keeps_order() {
        let candidates = (1..=12).rev().map(|i| card(i, "A")).collect();
        let shelf = select_diverse(candidates, 10);
        assert_eq!(ids(&shelf), (3..=12).rev().collect::<Vec<_>>());
    }

    #[test]
    fn test_diversity_empty() {
        assert!(select_diverse(Vec::new(), 10).is_empty());
    }
}
