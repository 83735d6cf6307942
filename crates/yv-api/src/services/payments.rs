//! Stripe webhook handling.
//!
//! The `Stripe-Signature` header carries `t=<unix>` and one or more
//! `v1=<hex>` entries. A signature is HMAC-SHA256 over `"{t}.{payload}"`
//! keyed with the endpoint secret.

use std::sync::Arc;

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;
use tracing::{info, warn};

use yv_models::Clock;
use yv_store::Store;

use crate::error::{ApiError, ApiResult};

type HmacSha256 = Hmac<Sha256>;

/// Maximum age of a signed webhook, in seconds
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

pub const CHECKOUT_COMPLETED: &str = "checkout.session.completed";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("missing Stripe-Signature header")]
    Missing,

    #[error("malformed Stripe-Signature header")]
    Malformed,

    #[error("signature timestamp outside tolerance")]
    Expired,

    #[error("no matching signature")]
    Mismatch,
}

/// Check `header` against `payload` at unix time `now`.
pub fn verify_signature(
    header: &str,
    payload: &[u8],
    secret: &str,
    now: i64,
    tolerance_secs: i64,
) -> Result<(), SignatureError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();
    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = value.parse::<i64>().ok(),
            Some(("v1", value)) => {
                if let Ok(bytes) = hex::decode(value) {
                    signatures.push(bytes);
                }
            }
            _ => {}
        }
    }
    let timestamp = timestamp.ok_or(SignatureError::Malformed)?;
    if signatures.is_empty() {
        return Err(SignatureError::Malformed);
    }
    if (now - timestamp).abs() > tolerance_secs {
        return Err(SignatureError::Expired);
    }

    let matches = signatures.iter().any(|signature| {
        let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
            return false;
        };
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        mac.verify_slice(signature).is_ok()
    });
    if matches {
        Ok(())
    } else {
        Err(SignatureError::Mismatch)
    }
}

/// Header value for `payload`, as Stripe would send it.
pub fn sign_payload(payload: &[u8], secret: &str, timestamp: i64) -> ApiResult<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| ApiError::internal(format!("Invalid webhook secret: {}", e)))?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(format!(
        "t={},v1={}",
        timestamp,
        hex::encode(mac.finalize().into_bytes())
    ))
}

#[derive(Debug, Deserialize)]
struct StripeEvent {
    #[serde(rename = "type")]
    kind: String,
    data: StripeEventData,
}

#[derive(Debug, Deserialize)]
struct StripeEventData {
    object: StripeObject,
}

#[derive(Debug, Default, Deserialize)]
struct StripeObject {
    #[serde(default)]
    metadata: Option<StripeMetadata>,
}

#[derive(Debug, Default, Deserialize)]
struct StripeMetadata {
    #[serde(rename = "userId")]
    user_id: Option<String>,
}

/// What the webhook did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum WebhookOutcome {
    PremiumGranted { user_id: String },
    UnknownUser { user_id: String },
    Ignored { event_type: String },
}

#[derive(Clone)]
pub struct PaymentService {
    store: Arc<dyn Store>,
    secret: Option<String>,
    clock: Arc<dyn Clock>,
}

impl PaymentService {
    pub fn new(store: Arc<dyn Store>, secret: Option<String>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            secret,
            clock,
        }
    }

    /// Verify and apply one webhook delivery. Replays are harmless: granting
    /// premium twice leaves the same state.
    pub async fn handle_webhook(
        &self,
        signature: Option<&str>,
        payload: &[u8],
    ) -> ApiResult<WebhookOutcome> {
        let secret = self
            .secret
            .as_deref()
            .ok_or_else(|| ApiError::internal("Stripe webhook secret is not configured"))?;
        let header = signature.ok_or(SignatureError::Missing).map_err(reject)?;
        verify_signature(
            header,
            payload,
            secret,
            self.clock.now().timestamp(),
            SIGNATURE_TOLERANCE_SECS,
        )
        .map_err(reject)?;

        let event: StripeEvent = serde_json::from_slice(payload)
            .map_err(|e| ApiError::bad_request(format!("Invalid event payload: {}", e)))?;
        if event.kind != CHECKOUT_COMPLETED {
            return Ok(WebhookOutcome::Ignored {
                event_type: event.kind,
            });
        }

        let user_id = event
            .data
            .object
            .metadata
            .and_then(|m| m.user_id)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ApiError::bad_request("Checkout session has no userId metadata"))?;

        if self.store.set_premium(&user_id, true).await? {
            info!(user_id = %user_id, "Premium granted");
            Ok(WebhookOutcome::PremiumGranted { user_id })
        } else {
            warn!(user_id = %user_id, "Checkout completed for unknown user");
            Ok(WebhookOutcome::UnknownUser { user_id })
        }
    }
}

fn reject(e: SignatureError) -> ApiError {
    warn!(error = %e, "Rejected webhook");
    ApiError::bad_request(format!("Invalid webhook signature: {}", e))
}
