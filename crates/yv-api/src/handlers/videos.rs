//! Video API handlers.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use yv_models::{Comment, ReactionCounts, Video, VideoEdit, VideoId};
use yv_pipeline::{PipelineReport, ThumbnailUpload, UploadRequest};

use crate::auth::{AuthUser, MaybeUser};
use crate::error::ApiResult;
use crate::handlers::form::Form;
use crate::services::{NewThumbnail, WatchPage};
use crate::state::AppState;

/// Watch page data. Signed-in viewers get a history entry.
pub async fn watch_video(
    State(state): State<AppState>,
    Path(video_id): Path<i64>,
    viewer: MaybeUser,
) -> ApiResult<Json<WatchPage>> {
    let video_id = VideoId::from(video_id);
    let page = state.videos.watch_page(video_id, viewer.id()).await?;

    if let Some(user_id) = viewer.id() {
        // History is a side effect; the page is served regardless
        if let Err(e) = state.engagement.record_watch(user_id, video_id).await {
            warn!(video_id = %video_id, user_id, error = %e, "Failed to record watch");
        }
    }
    Ok(Json(page))
}

#[derive(Serialize)]
pub struct UploadResponse {
    pub video: Video,
    pub report: PipelineReport,
}

/// Upload and ingest a new video.
pub async fn upload_video(
    State(state): State<AppState>,
    user: AuthUser,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<UploadResponse>)> {
    let mut form = Form::read(multipart).await?;
    let video = form.require_file("video")?;
    let thumbnail = form.take_file("thumbnail").map(|t| ThumbnailUpload {
        file_name: t.file_name,
        data: t.data,
    });

    let request = UploadRequest {
        owner_id: user.id.clone(),
        title: form.text("title").unwrap_or_default().to_string(),
        description: form.text("description").unwrap_or_default().to_string(),
        privacy: form.privacy()?,
        file_name: video.file_name,
        data: video.data,
        thumbnail,
    };

    let output = state.pipeline.run(request).await?;
    info!(
        video_id = %output.video.id,
        user_id = %user.id,
        elapsed_ms = output.report.elapsed_ms,
        "Video uploaded"
    );
    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            video: output.video,
            report: output.report,
        }),
    ))
}

/// Owner edit of title, description, privacy and thumbnail.
pub async fn edit_video(
    State(state): State<AppState>,
    Path(video_id): Path<i64>,
    user: AuthUser,
    multipart: Multipart,
) -> ApiResult<Json<Video>> {
    let mut form = Form::read(multipart).await?;
    let edit = VideoEdit {
        title: form.text("title").unwrap_or_default().to_string(),
        description: form.text("description").unwrap_or_default().to_string(),
        privacy: form.privacy()?,
    };
    let thumbnail = form.take_file("thumbnail").map(|t| NewThumbnail {
        file_name: t.file_name,
        data: t.data,
    });

    let video = state
        .videos
        .edit(VideoId::from(video_id), &user.id, edit, thumbnail)
        .await?;
    Ok(Json(video))
}

pub async fn delete_video(
    State(state): State<AppState>,
    Path(video_id): Path<i64>,
    user: AuthUser,
) -> ApiResult<StatusCode> {
    state.videos.delete(VideoId::from(video_id), &user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct ReactionRequest {
    pub is_like: bool,
}

/// Toggle a like or dislike on a video.
pub async fn react_to_video(
    State(state): State<AppState>,
    Path(video_id): Path<i64>,
    user: AuthUser,
    Json(body): Json<ReactionRequest>,
) -> ApiResult<Json<ReactionCounts>> {
    let counts = state
        .engagement
        .react_to_video(&user.id, VideoId::from(video_id), body.is_like)
        .await?;
    Ok(Json(counts))
}

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub content: String,
    #[serde(default)]
    pub parent_id: Option<i64>,
}

pub async fn add_comment(
    State(state): State<AppState>,
    Path(video_id): Path<i64>,
    user: AuthUser,
    Json(body): Json<CommentRequest>,
) -> ApiResult<(StatusCode, Json<Comment>)> {
    let comment = state
        .engagement
        .add_comment(&user.id, VideoId::from(video_id), &body.content, body.parent_id)
        .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}
