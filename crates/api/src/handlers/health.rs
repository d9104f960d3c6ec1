use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::routes::AppState;

pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let pool = state.worker_pool.stats();

    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "service": "item-service",
        "version": env!("CARGO_PKG_VERSION"),
        "worker_pool": {
            "size": pool.size,
            "active_jobs": pool.active_jobs,
            "completed_jobs": pool.completed_jobs,
            "panicked_jobs": pool.panicked_jobs,
        }
    }))
}
