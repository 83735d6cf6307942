//! Server settings read from the environment.

use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    /// `*` allows any origin without credentials.
    pub cors_origins: Vec<String>,
    /// Request body ceiling; uploads carry whole videos.
    pub max_upload_bytes: usize,
    /// HS256 secret of the identity provider's tokens
    pub jwt_secret: Option<String>,
    /// Expected `iss` claim, when set
    pub jwt_issuer: Option<String>,
    /// Stripe endpoint secret (`whsec_...`)
    pub stripe_webhook_secret: Option<String>,
    /// Selects the Redis cache when set
    pub redis_url: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: vec!["*".to_string()],
            max_upload_bytes: 512 * 1024 * 1024,
            jwt_secret: None,
            jwt_issuer: None,
            stripe_webhook_secret: None,
            redis_url: None,
        }
    }
}

impl ApiConfig {
    /// Unset or unparsable variables keep their defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: non_empty_var("API_HOST").unwrap_or(defaults.host),
            port: parsed_var("API_PORT").unwrap_or(defaults.port),
            cors_origins: non_empty_var("CORS_ORIGINS")
                .map(|list| list.split(',').map(|o| o.trim().to_string()).collect())
                .unwrap_or(defaults.cors_origins),
            max_upload_bytes: parsed_var("MAX_UPLOAD_BYTES").unwrap_or(defaults.max_upload_bytes),
            jwt_secret: non_empty_var("AUTH_JWT_SECRET"),
            jwt_issuer: non_empty_var("AUTH_JWT_ISSUER"),
            stripe_webhook_secret: non_empty_var("STRIPE_WEBHOOK_SECRET"),
            redis_url: non_empty_var("REDIS_URL"),
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parsed_var<T: FromStr>(key: &str) -> Option<T> {
    non_empty_var(key).and_then(|v| v.trim().parse().ok())
}
