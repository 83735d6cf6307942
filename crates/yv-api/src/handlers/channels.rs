//! Channel pages and subscriptions.

use axum::extract::{Path, Query, State};
use axum::Json;

use crate::auth::{AuthUser, MaybeUser};
use crate::error::ApiResult;
use crate::handlers::CursorQuery;
use crate::services::{ChannelPage, SubscriptionState};
use crate::state::AppState;

pub async fn channel(
    State(state): State<AppState>,
    Path(username): Path<String>,
    viewer: MaybeUser,
    Query(query): Query<CursorQuery>,
) -> ApiResult<Json<ChannelPage>> {
    let page = state
        .channels
        .channel(Some(&username), viewer.id(), query.cursor())
        .await?;
    Ok(Json(page))
}

/// The signed-in user's own channel.
pub async fn own_channel(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<CursorQuery>,
) -> ApiResult<Json<ChannelPage>> {
    let page = state
        .channels
        .channel(None, Some(&user.id), query.cursor())
        .await?;
    Ok(Json(page))
}

pub async fn toggle_subscription(
    State(state): State<AppState>,
    Path(creator_id): Path<String>,
    user: AuthUser,
) -> ApiResult<Json<SubscriptionState>> {
    let subscription = state
        .engagement
        .toggle_subscription(&user.id, &creator_id)
        .await?;
    Ok(Json(subscription))
}
