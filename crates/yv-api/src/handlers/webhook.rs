//! Stripe webhook endpoint.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;

use crate::error::ApiResult;
use crate::services::WebhookOutcome;
use crate::state::AppState;

pub const SIGNATURE_HEADER: &str = "Stripe-Signature";

/// The raw body is needed for the signature, so it is not parsed as JSON by
/// an extractor.
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<WebhookOutcome>> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());
    let outcome = state.payments.handle_webhook(signature, &body).await?;
    Ok(Json(outcome))
}
