//! Home feed assembly against an in-memory store and cache.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use yv_cache::{Cache, MemoryCache};
use yv_feed::{FeedAssembler, FeedConfig, Listings};
use yv_models::{
    HistoryItem, LikedVideo, ManualClock, NewVideo, Privacy, ShelfKind, VideoCard, VideoId,
    TRENDING_CACHE_KEY,
};
use yv_store::{
    InteractionRepo, ListingRepo, SqliteStore, StoreResult, UserRepo, VideoRepo,
};

/// Delegating store that counts trending aggregations.
struct CountingStore {
    inner: SqliteStore,
    trending_calls: AtomicUsize,
}

#[async_trait]
impl ListingRepo for CountingStore {
    async fn list_public_videos(
        &self,
        cursor: Option<i64>,
        limit: usize,
    ) -> StoreResult<Vec<VideoCard>> {
        self.inner.list_public_videos(cursor, limit).await
    }

    async fn list_owner_videos(
        &self,
        owner_id: &str,
        include_non_public: bool,
        cursor: Option<i64>,
        limit: usize,
    ) -> StoreResult<Vec<VideoCard>> {
        self.inner
            .list_owner_videos(owner_id, include_non_public, cursor, limit)
            .await
    }

    async fn list_history(
        &self,
        user_id: &str,
        cursor: Option<i64>,
        limit: usize,
    ) -> StoreResult<Vec<HistoryItem>> {
        self.inner.list_history(user_id, cursor, limit).await
    }

    async fn list_liked(
        &self,
        user_id: &str,
        cursor: Option<i64>,
        limit: usize,
    ) -> StoreResult<Vec<LikedVideo>> {
        self.inner.list_liked(user_id, cursor, limit).await
    }

    async fn search_videos(
        &self,
        terms: &[String],
        cursor: Option<i64>,
        limit: usize,
    ) -> StoreResult<Vec<VideoCard>> {
        self.inner.search_videos(terms, cursor, limit).await
    }

    async fn subscribed_unwatched(
        &self,
        viewer_id: &str,
        limit: usize,
    ) -> StoreResult<Vec<VideoCard>> {
        self.inner.subscribed_unwatched(viewer_id, limit).await
    }

    async fn trending(&self, limit: usize) -> StoreResult<Vec<VideoCard>> {
        self.trending_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.trending(limit).await
    }
}

fn video(owner: &str, title: &str, privacy: Privacy) -> NewVideo {
    NewVideo {
        owner_id: owner.to_string(),
        title: title.to_string(),
        description: String::new(),
        video_url: format!("/media/videos/{title}.mp4"),
        thumbnail_url: String::new(),
        preview_url: String::new(),
        duration: "00:00:05".to_string(),
        privacy,
        ai_summary: String::new(),
    }
}

async fn seeded_store(users: &[&str]) -> SqliteStore {
    let store = SqliteStore::in_memory().await.unwrap();
    for id in users {
        store.ensure_user(id, id).await.unwrap();
    }
    store
}

#[tokio::test]
async fn test_trending_is_cached_between_calls() {
    let inner = seeded_store(&["a"]).await;
    inner.insert_video(&video("a", "one", Privacy::Public)).await.unwrap();
    let store = Arc::new(CountingStore {
        inner,
        trending_calls: AtomicUsize::new(0),
    });
    let clock = ManualClock::default();
    let cache = Arc::new(MemoryCache::with_clock(Arc::new(clock.clone())));
    let feed = FeedAssembler::new(store.clone(), cache.clone(), FeedConfig::default());

    let first = feed.home(None, None).await.unwrap();
    assert_eq!(first.shelf.as_ref().unwrap().kind, ShelfKind::Trending);
    let second = feed.home(None, None).await.unwrap();
    assert_eq!(first.shelf, second.shelf);
    assert_eq!(store.trending_calls.load(Ordering::SeqCst), 1);
    assert!(cache.get(TRENDING_CACHE_KEY).await.unwrap().is_some());

    clock.advance(chrono::Duration::minutes(16));
    feed.home(None, None).await.unwrap();
    assert_eq!(store.trending_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_empty_trending_means_no_shelf() {
    let store = Arc::new(seeded_store(&[]).await);
    let feed = FeedAssembler::new(store, Arc::new(MemoryCache::new()), FeedConfig::default());

    let home = feed.home(None, None).await.unwrap();
    assert!(home.shelf.is_none());
    assert!(home.feed.items.is_empty());
    assert!(home.feed.is_last());
}

#[tokio::test]
async fn test_personalized_shelf_for_subscriber() {
    let store = Arc::new(seeded_store(&["creator", "viewer"]).await);
    let seen = store
        .insert_video(&video("creator", "seen", Privacy::Public))
        .await
        .unwrap();
    let fresh = store
        .insert_video(&video("creator", "fresh", Privacy::Public))
        .await
        .unwrap();
    store.toggle_subscription("viewer", "creator").await.unwrap();
    store.record_watch("viewer", seen.id, Utc::now()).await.unwrap();

    let feed = FeedAssembler::new(store, Arc::new(MemoryCache::new()), FeedConfig::default());
    let home = feed.home(Some("viewer"), None).await.unwrap();
    let shelf = home.shelf.unwrap();
    assert_eq!(shelf.kind, ShelfKind::FreshFromCreators);
    assert_eq!(shelf.title, "Fresh from your Creators");
    let ids: Vec<VideoId> = shelf.videos.iter().map(|v| v.id).collect();
    assert_eq!(ids, vec![fresh.id]);

    // Anonymous viewers fall back to trending
    let anonymous = feed.home(None, None).await.unwrap();
    assert_eq!(anonymous.shelf.unwrap().kind, ShelfKind::Trending);
}

#[tokio::test]
async fn test_shelf_only_on_first_page() {
    let store = Arc::new(seeded_store(&["a"]).await);
    for i in 0..15 {
        store
            .insert_video(&video("a", &format!("v{i}"), Privacy::Public))
            .await
            .unwrap();
    }
    let feed = FeedAssembler::new(store, Arc::new(MemoryCache::new()), FeedConfig::default());

    let first = feed.home(None, None).await.unwrap();
    assert!(first.shelf.is_some());
    assert_eq!(first.feed.items.len(), 12);
    let cursor = first.feed.next_cursor.unwrap();
    assert_eq!(cursor, first.feed.items[11].id.get());

    let second = feed.home(None, Some(cursor)).await.unwrap();
    assert!(second.shelf.is_none());
    assert_eq!(second.feed.items.len(), 3);
    assert!(second.feed.is_last());
}

#[tokio::test]
async fn test_main_page_served_from_cache_within_ttl() {
    let store = Arc::new(seeded_store(&["a"]).await);
    store
        .insert_video(&video("a", "old", Privacy::Public))
        .await
        .unwrap();
    let clock = ManualClock::default();
    let cache = Arc::new(MemoryCache::with_clock(Arc::new(clock.clone())));
    let feed = FeedAssembler::new(store.clone(), cache, FeedConfig::default());

    assert_eq!(feed.main_page(None).await.unwrap().items.len(), 1);
    store
        .insert_video(&video("a", "new", Privacy::Public))
        .await
        .unwrap();
    assert_eq!(feed.main_page(None).await.unwrap().items.len(), 1);

    clock.advance(chrono::Duration::seconds(61));
    assert_eq!(feed.main_page(None).await.unwrap().items.len(), 2);
}

#[tokio::test]
async fn test_listing_views_chain() {
    let store = Arc::new(seeded_store(&["owner", "viewer"]).await);
    for i in 0..25 {
        let privacy = if i % 5 == 0 { Privacy::Private } else { Privacy::Public };
        let v = store
            .insert_video(&video("owner", &format!("clip {i}"), privacy))
            .await
            .unwrap();
        if privacy == Privacy::Public {
            store.record_watch("viewer", v.id, Utc::now()).await.unwrap();
        }
    }
    let listings = Listings::new(store, FeedConfig::default());

    let mut cursor = None;
    let mut history = Vec::new();
    loop {
        let page = listings.history("viewer", cursor).await.unwrap();
        history.extend(page.items.into_iter().map(|h| h.history_id));
        match page.next_cursor {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }
    assert_eq!(history.len(), 20);
    assert!(history.windows(2).all(|w| w[0] > w[1]));

    let public = listings.channel_videos("owner", Some("viewer"), None).await.unwrap();
    assert!(public.items.iter().all(|v| v.privacy == Privacy::Public));
    let own = listings.my_videos("owner", None).await.unwrap();
    assert_eq!(own.items.len(), 12);
    assert!(own.items.iter().any(|v| v.privacy == Privacy::Private));

    let found = listings.search("CLIP 2", None).await.unwrap();
    assert!(found.items.iter().all(|v| v.title.contains("clip") && v.title.contains('2')));
    assert!(listings.search("   ", None).await.unwrap().items.is_empty());
}

#[tokio::test]
async fn test_cache_write_failure_does_not_fail_request() {
    struct BrokenCache;

    #[async_trait]
    impl Cache for BrokenCache {
        async fn get(&self, _key: &str) -> yv_cache::CacheResult<Option<String>> {
            Err(yv_cache::CacheError::Unavailable("down".into()))
        }

        async fn set(&self, _key: &str, _value: String, _ttl: Duration) -> yv_cache::CacheResult<()> {
            Err(yv_cache::CacheError::Unavailable("down".into()))
        }

        fn name(&self) -> &'static str {
            "broken"
        }
    }

    let store = Arc::new(seeded_store(&["a"]).await);
    store
        .insert_video(&video("a", "one", Privacy::Public))
        .await
        .unwrap();
    let feed = FeedAssembler::new(store, Arc::new(BrokenCache), FeedConfig::default());

    let home = feed.home(None, None).await.unwrap();
    assert_eq!(home.feed.items.len(), 1);
    assert!(home.shelf.is_some());
}
