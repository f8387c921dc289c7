use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/api/config", get(page_config))
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "active_trips": state.trip_count()
    }))
}

/// Settings the page needs before it starts drawing.
async fn page_config(State(state): State<AppState>) -> Json<Value> {
    let config = state.config();
    Json(json!({
        "loader_delay_ms": config.loader_delay_ms,
        "step_interval_ms": config.step_interval_ms,
        "bus_speed_mps": config.bus_speed_mps
    }))
}
