//! Home feed and search.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use yv_models::{parse_cursor, HomeFeed};

use crate::auth::MaybeUser;
use crate::error::ApiResult;
use crate::handlers::CursorQuery;
use crate::services::SearchResults;
use crate::state::AppState;

/// Shelf plus one page of the main feed.
pub async fn home_feed(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Query(query): Query<CursorQuery>,
) -> ApiResult<Json<HomeFeed>> {
    let feed = state.feed.home(viewer.id(), query.cursor()).await?;
    Ok(Json(feed))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    pub cursor: Option<String>,
}

pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<SearchResults>> {
    let results = state
        .channels
        .search(&query.q, parse_cursor(query.cursor.as_deref()))
        .await?;
    Ok(Json(results))
}
