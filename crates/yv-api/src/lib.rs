//! Axum HTTP API server.
//!
//! This crate provides:
//! - The JSON API over feeds, videos, channels and playlists
//! - Identity token verification
//! - The Stripe webhook
//! - Prometheus metrics

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::{AppState, Backends};
