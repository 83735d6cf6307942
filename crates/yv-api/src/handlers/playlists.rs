//! Playlist handlers. Every route is owner-only.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use yv_models::{Playlist, PlaylistDetails, VideoId};

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::services::PlaylistToggle;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreatePlaylistRequest {
    pub title: String,
}

pub async fn create_playlist(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<CreatePlaylistRequest>,
) -> ApiResult<(StatusCode, Json<Playlist>)> {
    let playlist = state.playlists.create(&user.id, &body.title).await?;
    Ok((StatusCode::CREATED, Json(playlist)))
}

pub async fn get_playlist(
    State(state): State<AppState>,
    Path(playlist_id): Path<i64>,
    user: AuthUser,
) -> ApiResult<Json<PlaylistDetails>> {
    let details = state.playlists.details(playlist_id, &user.id).await?;
    Ok(Json(details))
}

#[derive(Debug, Deserialize)]
pub struct RenamePlaylistRequest {
    pub name: String,
}

pub async fn rename_playlist(
    State(state): State<AppState>,
    Path(playlist_id): Path<i64>,
    user: AuthUser,
    Json(body): Json<RenamePlaylistRequest>,
) -> ApiResult<Json<Playlist>> {
    let playlist = state
        .playlists
        .rename(playlist_id, &user.id, &body.name)
        .await?;
    Ok(Json(playlist))
}

pub async fn delete_playlist(
    State(state): State<AppState>,
    Path(playlist_id): Path<i64>,
    user: AuthUser,
) -> ApiResult<StatusCode> {
    state.playlists.delete(playlist_id, &user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct PlaylistVideoRequest {
    pub video_id: i64,
}

/// Add the video, or take it out when already present.
pub async fn toggle_playlist_video(
    State(state): State<AppState>,
    Path(playlist_id): Path<i64>,
    user: AuthUser,
    Json(body): Json<PlaylistVideoRequest>,
) -> ApiResult<Json<PlaylistToggle>> {
    let toggle = state
        .playlists
        .toggle_video(playlist_id, &user.id, VideoId::from(body.video_id))
        .await?;
    Ok(Json(toggle))
}

pub async fn remove_playlist_video(
    State(state): State<AppState>,
    Path((playlist_id, video_id)): Path<(i64, i64)>,
    user: AuthUser,
) -> ApiResult<StatusCode> {
    state
        .playlists
        .remove_video(playlist_id, &user.id, VideoId::from(video_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
