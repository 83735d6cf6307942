//! Liveness and readiness probes.

use std::fmt::Display;
use std::future::Future;
use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct Liveness {
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: DateTime<Utc>,
}

/// Answers as long as the process can serve requests.
pub async fn health() -> Json<Liveness> {
    Json(Liveness {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: Utc::now(),
    })
}

/// Outcome of one dependency check, e.g. `{"status":"ok","latency_ms":3}`.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Probe {
    Ok { latency_ms: u64 },
    Error { error: String },
}

impl Probe {
    async fn run<E: Display>(check: impl Future<Output = Result<(), E>>) -> Self {
        let started = Instant::now();
        match check.await {
            Ok(()) => Probe::Ok {
                latency_ms: started.elapsed().as_millis() as u64,
            },
            Err(e) => Probe::Error {
                error: e.to_string(),
            },
        }
    }

    fn passed(&self) -> bool {
        matches!(self, Probe::Ok { .. })
    }
}

#[derive(Serialize)]
pub struct Dependencies {
    pub database: Probe,
    pub storage: Probe,
}

#[derive(Serialize)]
pub struct Readiness {
    pub status: &'static str,
    pub checks: Dependencies,
}

/// Ready once the metadata store and the object store both answer;
/// otherwise 503 with the failing check spelled out.
pub async fn ready(
    State(state): State<AppState>,
) -> Result<Json<Readiness>, (StatusCode, Json<Readiness>)> {
    let (database, storage) = tokio::join!(
        Probe::run(state.store.ping()),
        Probe::run(state.objects.check_connectivity()),
    );

    if database.passed() && storage.passed() {
        return Ok(Json(Readiness {
            status: "ready",
            checks: Dependencies { database, storage },
        }));
    }
    Err((
        StatusCode::SERVICE_UNAVAILABLE,
        Json(Readiness {
            status: "degraded",
            checks: Dependencies { database, storage },
        }),
    ))
}
