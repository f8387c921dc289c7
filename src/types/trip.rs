use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::geo::{Coordinate, Route};
use crate::types::mover::{FailureKind, MoverPhase, MoverState, ARRIVED_TEXT, CALCULATING_TEXT};

pub const INVALID_LOCATION_MESSAGE: &str =
    "Invalid location data. Please go back and enter valid locations.";

/// Raw page query. Values stay as strings until validated so that a
/// malformed number is reported the same way as a missing one.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationQuery {
    pub origin_lat: Option<String>,
    pub origin_lon: Option<String>,
    pub dest_lat: Option<String>,
    pub dest_lon: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TripEndpoints {
    pub origin: Coordinate,
    pub destination: Coordinate,
}

impl TripEndpoints {
    pub fn from_query(query: &LocationQuery) -> Option<Self> {
        let origin = Coordinate::new(
            parse_number(query.origin_lat.as_deref())?,
            parse_number(query.origin_lon.as_deref())?,
        );
        let destination = Coordinate::new(
            parse_number(query.dest_lat.as_deref())?,
            parse_number(query.dest_lon.as_deref())?,
        );
        if !origin.is_valid() || !destination.is_valid() {
            return None;
        }
        Some(Self {
            origin,
            destination,
        })
    }
}

fn parse_number(raw: Option<&str>) -> Option<f64> {
    raw.map(str::trim)
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusStop {
    pub name: String,
    pub position: Coordinate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerKind {
    Rider,
    Destination,
    Stop,
    Bus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub kind: MarkerKind,
    pub label: String,
    pub position: Coordinate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    pub color: String,
    pub weight: u32,
    pub opacity: f64,
    pub route: Route,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripPlan {
    pub endpoints: TripEndpoints,
    pub stops: Vec<BusStop>,
    pub markers: Vec<Marker>,
    /// Bus approach (stop to rider) first, then the rider's own trip.
    pub polylines: Vec<Polyline>,
}

/// Latest view of a running trip, as served to the page. Phase and mover
/// fields sit at the top level; mover fields are absent until the route resolves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripSnapshot {
    pub trip_id: String,
    #[serde(flatten)]
    pub phase: MoverPhase,
    #[serde(flatten)]
    pub state: Option<MoverState>,
    pub eta_text: String,
    pub updated_at: DateTime<Utc>,
}

impl TripSnapshot {
    pub fn pending(trip_id: &str) -> Self {
        Self {
            trip_id: trip_id.to_string(),
            phase: MoverPhase::Idle,
            state: None,
            eta_text: CALCULATING_TEXT.to_string(),
            updated_at: Utc::now(),
        }
    }

    pub fn with_update(&self, phase: MoverPhase, state: &MoverState) -> Self {
        let eta_text = match phase {
            MoverPhase::Arrived => ARRIVED_TEXT.to_string(),
            _ => state.eta_text(),
        };
        Self {
            trip_id: self.trip_id.clone(),
            phase,
            state: Some(*state),
            eta_text,
            updated_at: Utc::now(),
        }
    }

    pub fn with_failure(&self, kind: FailureKind) -> Self {
        Self {
            trip_id: self.trip_id.clone(),
            phase: MoverPhase::Failed(kind),
            state: self.state,
            eta_text: kind.message().to_string(),
            updated_at: Utc::now(),
        }
    }
}
