use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::pipeline::plan;
use crate::state::AppState;
use crate::types::geo::Route;
use crate::types::trip::{LocationQuery, TripEndpoints, TripPlan, TripSnapshot, INVALID_LOCATION_MESSAGE};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/plan", get(plan_trip))
        .route("/api/trips", post(start_trip))
        .route("/api/trips/:trip_id", get(get_trip).delete(cancel_trip))
}

/// Optional body: the bus approach route the page got from `/api/plan`, so
/// the trip does not resolve it a second time.
#[derive(Deserialize)]
struct StartTripRequest {
    route: Route,
}

#[derive(Serialize, Deserialize)]
struct StartTripResponse {
    trip_id: String,
}

fn endpoints(query: &LocationQuery) -> Result<TripEndpoints, AppError> {
    TripEndpoints::from_query(query)
        .ok_or_else(|| AppError::BadRequest(INVALID_LOCATION_MESSAGE.to_string()))
}

async fn plan_trip(
    State(state): State<AppState>,
    Query(query): Query<LocationQuery>,
) -> Result<Json<TripPlan>, AppError> {
    let endpoints = endpoints(&query)?;
    let plan = plan::plan_trip(state.source(), endpoints).await?;
    Ok(Json(plan))
}

async fn start_trip(
    State(state): State<AppState>,
    Query(query): Query<LocationQuery>,
    body: Option<Json<StartTripRequest>>,
) -> Result<(StatusCode, Json<StartTripResponse>), AppError> {
    let endpoints = endpoints(&query)?;
    let approach = match body {
        Some(Json(request)) => {
            if request.route.len() < 2 || !request.route.has_valid_geometry() {
                return Err(AppError::BadRequest("Invalid route geometry".to_string()));
            }
            Some(request.route)
        }
        None => None,
    };
    let planned = approach.is_some();
    let trip_id = state.start_trip(endpoints, approach);

    tracing::info!(
        "Started trip {} towards ({:.5}, {:.5}), planned route supplied: {}",
        trip_id,
        endpoints.origin.lat,
        endpoints.origin.lon,
        planned
    );

    Ok((StatusCode::CREATED, Json(StartTripResponse { trip_id })))
}

async fn get_trip(
    State(state): State<AppState>,
    Path(trip_id): Path<String>,
) -> Result<Json<TripSnapshot>, AppError> {
    state
        .snapshot(&trip_id)
        .map(Json)
        .ok_or(AppError::NotFound(trip_id))
}

async fn cancel_trip(
    State(state): State<AppState>,
    Path(trip_id): Path<String>,
) -> Result<StatusCode, AppError> {
    if state.cancel_trip(&trip_id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(trip_id))
    }
}
