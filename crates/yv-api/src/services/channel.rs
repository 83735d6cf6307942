//! Channel pages and search.

use std::sync::Arc;

use serde::Serialize;

use yv_feed::{search_terms, Listings};
use yv_models::{Page, PlaylistMembership, User, VideoCard};
use yv_store::Store;

use crate::error::{ApiError, ApiResult};

/// Creators listed next to video search results
const CREATOR_RESULTS: usize = 20;

#[derive(Debug, Serialize)]
pub struct ChannelPage {
    pub user: User,
    pub subscriber_count: i64,
    pub is_subscribed: bool,
    pub is_own_channel: bool,
    pub videos: Page<VideoCard>,
    pub playlists: Vec<PlaylistMembership>,
}

#[derive(Debug, Serialize)]
pub struct SearchResults {
    pub query: String,
    pub videos: Page<VideoCard>,
    pub creators: Vec<User>,
}

#[derive(Clone)]
pub struct ChannelService {
    store: Arc<dyn Store>,
    listings: Listings<dyn Store>,
}

impl ChannelService {
    pub fn new(store: Arc<dyn Store>, listings: Listings<dyn Store>) -> Self {
        Self { store, listings }
    }

    /// Channel of `username`, or the viewer's own when no name is given.
    pub async fn channel(
        &self,
        username: Option<&str>,
        viewer_id: Option<&str>,
        cursor: Option<i64>,
    ) -> ApiResult<ChannelPage> {
        let user = match (username, viewer_id) {
            (Some(name), _) => self.store.get_user_by_username(name).await?,
            (None, Some(viewer)) => self.store.get_user(viewer).await?,
            (None, None) => return Err(ApiError::unauthorized("Sign in to see your channel")),
        }
        .ok_or_else(|| ApiError::not_found("Channel not found"))?;

        let owner_id = user.id.as_str();
        let is_own_channel = viewer_id == Some(owner_id);
        let is_subscribed = async {
            match viewer_id {
                Some(viewer) if !is_own_channel => self.store.is_subscribed(viewer, owner_id).await,
                _ => Ok(false),
            }
        };
        let videos = async {
            self.listings
                .channel_videos(owner_id, viewer_id, cursor)
                .await
                .map_err(ApiError::from)
        };
        let counts_and_lists = async {
            tokio::try_join!(
                self.store.subscriber_count(owner_id),
                is_subscribed,
                self.store.list_playlists(owner_id, None),
            )
            .map_err(ApiError::from)
        };
        let (videos, (subscriber_count, is_subscribed, playlists)) =
            tokio::try_join!(videos, counts_and_lists)?;

        Ok(ChannelPage {
            user,
            subscriber_count,
            is_subscribed,
            is_own_channel,
            videos,
            playlists,
        })
    }

    /// Videos matching every term, plus matching creators.
    pub async fn search(&self, query: &str, cursor: Option<i64>) -> ApiResult<SearchResults> {
        let terms = search_terms(query);
        let creators = async {
            if terms.is_empty() {
                return Ok(Vec::new());
            }
            self.store
                .search_users(&terms, CREATOR_RESULTS)
                .await
                .map_err(ApiError::from)
        };
        let videos = async { self.listings.search(query, cursor).await.map_err(ApiError::from) };
        let (videos, creators) = tokio::try_join!(videos, creators)?;

        Ok(SearchResults {
            query: query.trim().to_string(),
            videos,
            creators,
        })
    }
}
