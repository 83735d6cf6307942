//! Bearer token authentication.
//!
//! Tokens are issued by the identity provider and signed with a shared HS256
//! secret. The first authenticated request of a user creates their row.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;

/// Claims read from an identity token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Expiration
    pub exp: i64,
}

impl Claims {
    /// Username for a first-time user, falling back to the subject.
    pub fn username(&self) -> &str {
        self.preferred_username
            .as_deref()
            .or(self.username.as_deref())
            .filter(|u| !u.trim().is_empty())
            .unwrap_or(&self.sub)
    }
}

/// Authenticated user extracted from request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
    pub username: String,
}

/// The user when a valid token is present. Requests without a token are
/// anonymous; a bad token is still rejected.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<AuthUser>);

impl MaybeUser {
    pub fn id(&self) -> Option<&str> {
        self.0.as_ref().map(|u| u.id.as_str())
    }
}

/// Verifies HS256 identity tokens.
pub struct TokenVerifier {
    key: Option<DecodingKey>,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: Option<&str>, issuer: Option<&str>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_aud = false;
        if let Some(issuer) = issuer {
            validation.set_issuer(&[issuer]);
        }
        Self {
            key: secret.map(|s| DecodingKey::from_secret(s.as_bytes())),
            validation,
        }
    }

    pub fn verify(&self, token: &str) -> Result<Claims, ApiError> {
        let key = self
            .key
            .as_ref()
            .ok_or_else(|| ApiError::unauthorized("Authentication is not configured"))?;
        let data = decode::<Claims>(token, key, &self.validation)
            .map_err(|e| ApiError::unauthorized(format!("Token validation failed: {}", e)))?;
        Ok(data.claims)
    }
}

fn bearer_token(parts: &Parts) -> Result<Option<&str>, ApiError> {
    let Some(header) = parts.headers.get("Authorization") else {
        return Ok(None);
    };
    let value = header
        .to_str()
        .map_err(|_| ApiError::unauthorized("Invalid Authorization header"))?;
    value
        .strip_prefix("Bearer ")
        .map(Some)
        .ok_or_else(|| ApiError::unauthorized("Invalid Authorization header format"))
}

async fn authenticate(token: &str, state: &AppState) -> Result<AuthUser, ApiError> {
    let claims = state.tokens.verify(token)?;
    let user = state.store.ensure_user(&claims.sub, claims.username()).await?;
    debug!(user_id = %user.id, "Authenticated request");
    Ok(AuthUser {
        id: user.id,
        username: user.username,
    })
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?
            .ok_or_else(|| ApiError::unauthorized("Missing Authorization header"))?;
        authenticate(token, state).await
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match bearer_token(parts)? {
            Some(token) => Ok(MaybeUser(Some(authenticate(token, state).await?))),
            None => Ok(MaybeUser(None)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn token(secret: &str, exp: i64) -> String {
        let claims = Claims {
            sub: "user-1".into(),
            preferred_username: Some("alice".into()),
            username: None,
            exp,
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn far_future() -> i64 {
        chrono::Utc::now().timestamp() + 3600
    }

    #[test]
    fn test_verify_roundtrip() {
        let verifier = TokenVerifier::new(Some("s3cret"), None);
        let claims = verifier.verify(&token("s3cret", far_future())).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.username(), "alice");
    }

    #[test]
    fn test_rejects_wrong_secret_and_expired() {
        let verifier = TokenVerifier::new(Some("s3cret"), None);
        assert!(verifier.verify(&token("other", far_future())).is_err());
        assert!(verifier.verify(&token("s3cret", 1_000)).is_err());
    }

    #[test]
    fn test_unconfigured_rejects_everything() {
        let verifier = TokenVerifier::new(None, None);
        assert!(matches!(
            verifier.verify(&token("s3cret", far_future())),
            Err(ApiError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_username_fallback() {
        let claims = Claims {
            sub: "abc".into(),
            preferred_username: Some("  ".into()),
            username: None,
            exp: 0,
        };
        assert_eq!(claims.username(), "abc");
    }
}
