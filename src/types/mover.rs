use serde::{Deserialize, Serialize};

use crate::types::geo::Coordinate;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoverState {
    pub position: Coordinate,
    pub segment_index: usize,
    pub remaining_distance_m: f64,
    pub eta_seconds: u64,
}

impl MoverState {
    pub fn eta_text(&self) -> String {
        format_eta(self.eta_seconds)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    InsufficientGeometry,
    SourceUnavailable,
}

impl FailureKind {
    pub fn message(&self) -> &'static str {
        match self {
            FailureKind::InsufficientGeometry => "Route is too short to animate.",
            FailureKind::SourceUnavailable => "No route found.",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "phase", content = "failure")]
pub enum MoverPhase {
    Idle,
    Stepping,
    Arrived,
    Failed(FailureKind),
}

impl MoverPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, MoverPhase::Arrived | MoverPhase::Failed(_))
    }
}

/// What a single tick produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MoverEvent {
    /// Moved part of the way along the current segment.
    Step(MoverState),
    /// Landed exactly on the next waypoint.
    Snap(MoverState),
    Arrived(MoverState),
}

impl MoverEvent {
    pub fn state(&self) -> &MoverState {
        match self {
            MoverEvent::Step(state) | MoverEvent::Snap(state) | MoverEvent::Arrived(state) => state,
        }
    }

    pub fn phase(&self) -> MoverPhase {
        match self {
            MoverEvent::Arrived(_) => MoverPhase::Arrived,
            _ => MoverPhase::Stepping,
        }
    }
}

pub const CALCULATING_TEXT: &str = "Calculating ETA...";
pub const ARRIVED_TEXT: &str = "Bus has arrived!";

pub fn format_eta(eta_seconds: u64) -> String {
    format!("ETA: {} mins {} secs", eta_seconds / 60, eta_seconds % 60)
}
