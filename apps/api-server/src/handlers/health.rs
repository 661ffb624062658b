//! Health check endpoint.

use actix_web::{HttpResponse, web};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub database: &'static str,
    pub timestamp: String,
}

/// GET /api/v1/health
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let database = match &state.db {
        #[cfg(feature = "postgres")]
        Some(db) => match db.ping().await {
            Ok(()) => "up",
            Err(e) => {
                tracing::warn!(error = %e, "Database health check failed");
                "down"
            }
        },
        #[cfg(not(feature = "postgres"))]
        Some(_) => "up",
        None => "in-memory",
    };

    let response = HealthResponse {
        status: if database == "down" { "degraded" } else { "ok" },
        version: env!("CARGO_PKG_VERSION"),
        database,
        timestamp: chrono::Utc::now().to_rfc3339(),
    };

    HttpResponse::Ok().json(response)
}
