//! Comment handlers.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use yv_models::ReactionCounts;

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::handlers::videos::ReactionRequest;
use crate::state::AppState;

#[derive(Serialize)]
pub struct DeleteCommentResponse {
    /// The comment plus its replies
    pub deleted: u64,
}

pub async fn delete_comment(
    State(state): State<AppState>,
    Path(comment_id): Path<i64>,
    user: AuthUser,
) -> ApiResult<Json<DeleteCommentResponse>> {
    let deleted = state.engagement.delete_comment(&user.id, comment_id).await?;
    Ok(Json(DeleteCommentResponse { deleted }))
}

pub async fn react_to_comment(
    State(state): State<AppState>,
    Path(comment_id): Path<i64>,
    user: AuthUser,
    Json(body): Json<ReactionRequest>,
) -> ApiResult<Json<ReactionCounts>> {
    let counts = state
        .engagement
        .react_to_comment(&user.id, comment_id, body.is_like)
        .await?;
    Ok(Json(counts))
}
