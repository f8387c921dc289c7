use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::types::mover::FailureKind;

#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    #[error("No route found")]
    NoRoute,
    #[error("Routing service unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    #[error("Insufficient route geometry (need at least 2 points, got {0})")]
    InsufficientGeometry(usize),
    #[error("Invalid route geometry (waypoint {0} is not a usable coordinate)")]
    InvalidGeometry(usize),
    #[error("Invalid route distance: {0}")]
    InvalidDistance(f64),
    #[error("Invalid motion parameters: {0}")]
    InvalidMotion(String),
}

impl SimulationError {
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            SimulationError::InsufficientGeometry(_) => Some(FailureKind::InsufficientGeometry),
            SimulationError::InvalidGeometry(_) | SimulationError::InvalidDistance(_) => {
                Some(FailureKind::SourceUnavailable)
            }
            SimulationError::InvalidMotion(_) => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Route(#[from] RouteError),
    #[error(transparent)]
    Simulation(#[from] SimulationError),
    #[error("Trip not found: {0}")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::BadRequest(_)
            | AppError::Simulation(SimulationError::InsufficientGeometry(_))
            | AppError::Simulation(SimulationError::InvalidGeometry(_))
            | AppError::Simulation(SimulationError::InvalidDistance(_)) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Route(_) => StatusCode::BAD_GATEWAY,
            AppError::Simulation(SimulationError::InvalidMotion(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}
