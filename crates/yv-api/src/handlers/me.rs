//! The signed-in user's own listings and profile.

use axum::extract::{Multipart, Query, State};
use axum::Json;
use serde::Deserialize;

use yv_models::{
    parse_cursor, HistoryItem, LikedVideo, Page, PlaylistMembership, ProfileUpdate, User,
    VideoCard, VideoId,
};

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::handlers::form::Form;
use crate::handlers::CursorQuery;
use crate::state::AppState;

/// Own uploads, private and unlisted included.
pub async fn my_videos(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<CursorQuery>,
) -> ApiResult<Json<Page<VideoCard>>> {
    let page = state.listings.my_videos(&user.id, query.cursor()).await?;
    Ok(Json(page))
}

pub async fn history(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<CursorQuery>,
) -> ApiResult<Json<Page<HistoryItem>>> {
    let page = state.listings.history(&user.id, query.cursor()).await?;
    Ok(Json(page))
}

pub async fn liked(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<CursorQuery>,
) -> ApiResult<Json<Page<LikedVideo>>> {
    let page = state.listings.liked(&user.id, query.cursor()).await?;
    Ok(Json(page))
}

#[derive(Debug, Deserialize)]
pub struct PlaylistsQuery {
    pub video_id: Option<String>,
}

/// Own playlists, each flagged for `video_id` when given.
pub async fn my_playlists(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<PlaylistsQuery>,
) -> ApiResult<Json<Vec<PlaylistMembership>>> {
    let video_id = parse_cursor(query.video_id.as_deref()).map(VideoId::from);
    let playlists = state.playlists.list(&user.id, video_id).await?;
    Ok(Json(playlists))
}

pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    Json(update): Json<ProfileUpdate>,
) -> ApiResult<Json<User>> {
    let profile = state.accounts.update_profile(&user.id, update).await?;
    Ok(Json(profile))
}

/// Replace the profile picture with the `picture` part.
pub async fn upload_avatar(
    State(state): State<AppState>,
    user: AuthUser,
    multipart: Multipart,
) -> ApiResult<Json<User>> {
    let mut form = Form::read(multipart).await?;
    let picture = form.require_file("picture")?;
    let profile = state
        .accounts
        .set_picture(&user.id, &picture.file_name, picture.data)
        .await?;
    Ok(Json(profile))
}
