//! API routes.

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{delete, get, patch, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;

use crate::handlers::channels::{channel, own_channel, toggle_subscription};
use crate::handlers::comments::{delete_comment, react_to_comment};
use crate::handlers::feed::{home_feed, search};
use crate::handlers::me::{history, liked, my_playlists, my_videos, update_profile, upload_avatar};
use crate::handlers::playlists::{
    create_playlist, delete_playlist, get_playlist, remove_playlist_video, rename_playlist,
    toggle_playlist_video,
};
use crate::handlers::videos::{
    add_comment, delete_video, edit_video, react_to_video, upload_video, watch_video,
};
use crate::handlers::webhook::stripe_webhook;
use crate::handlers::{health, ready};
use crate::metrics::metrics_middleware;
use crate::middleware::{cors_layer, request_id, request_logging, security_headers, trace_layer};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let feed_routes = Router::new()
        .route("/feed", get(home_feed))
        .route("/search", get(search));

    let video_routes = Router::new()
        .route("/videos", post(upload_video))
        .route(
            "/videos/:video_id",
            get(watch_video).patch(edit_video).delete(delete_video),
        )
        .route("/videos/:video_id/reaction", post(react_to_video))
        .route("/videos/:video_id/comments", post(add_comment))
        .route("/comments/:comment_id", delete(delete_comment))
        .route("/comments/:comment_id/reaction", post(react_to_comment));

    // One parameter name per segment: a username for pages, a user id for
    // subscriptions
    let channel_routes = Router::new()
        .route("/channels/:channel", get(channel))
        .route("/channels/:channel/subscription", post(toggle_subscription));

    let me_routes = Router::new()
        .route("/me/channel", get(own_channel))
        .route("/me/videos", get(my_videos))
        .route("/me/history", get(history))
        .route("/me/liked", get(liked))
        .route("/me/playlists", get(my_playlists))
        .route("/me/profile", patch(update_profile))
        .route("/me/avatar", post(upload_avatar));

    let playlist_routes = Router::new()
        .route("/playlists", post(create_playlist))
        .route(
            "/playlists/:playlist_id",
            get(get_playlist)
                .patch(rename_playlist)
                .delete(delete_playlist),
        )
        .route("/playlists/:playlist_id/videos", post(toggle_playlist_video))
        .route(
            "/playlists/:playlist_id/videos/:video_id",
            delete(remove_playlist_video),
        );

    let api_routes = Router::new()
        .merge(feed_routes)
        .merge(video_routes)
        .merge(channel_routes)
        .merge(me_routes)
        .merge(playlist_routes)
        .route("/stripe/webhook", post(stripe_webhook));

    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready));

    // Metrics endpoint (if enabled)
    let metrics_routes = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    // Local blobs are served by the API itself
    let media_routes = match &state.media_root {
        Some(root) => Router::new().nest_service("/media", ServeDir::new(root)),
        None => Router::new(),
    };

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        .merge(media_routes)
        // Uploads are bounded by the configured limit instead of axum's default
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(state.config.max_upload_bytes))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn(request_id))
        .layer(trace_layer())
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
