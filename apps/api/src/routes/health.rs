use axum::{extract::State, Json};
use chrono::Utc;
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /
pub async fn root_handler() -> Json<Value> {
    Json(json!({
        "message": "Welcome to the Rezoom API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "operational"
    }))
}

/// GET /health
/// Returns a simple status object with service version.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": Utc::now().to_rfc3339()
    }))
}

/// GET /api/v1/status
pub async fn api_status_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "operational",
        "version": env!("CARGO_PKG_VERSION"),
        "features": [
            "Resume parsing (PDF/DOCX)",
            "AI-powered optimization",
            "ATS scoring",
            "PDF export",
            "Email delivery"
        ],
        "ai_model": state.ai.model(),
        "database": "PostgreSQL",
        "timestamp": Utc::now().to_rfc3339()
    }))
}

/// GET /api/v1/ai/health
/// Probes the inference service; unreachable means degraded, not down.
pub async fn ai_health_handler(State(state): State<AppState>) -> Json<Value> {
    match state.ai.list_models().await {
        Ok(models) => Json(json!({
            "status": "healthy",
            "ai_available": true,
            "models": models
        })),
        Err(e) => {
            tracing::warn!("AI health probe failed: {e}");
            Json(json!({
                "status": "degraded",
                "ai_available": false
            }))
        }
    }
}
