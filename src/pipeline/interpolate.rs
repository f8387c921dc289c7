use crate::error::SimulationError;
use crate::types::geo::Route;
use crate::types::mover::{MoverEvent, MoverState};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionConfig {
    speed_mps: f64,
    step_interval_ms: u64,
}

impl MotionConfig {
    pub fn new(speed_mps: f64, step_interval_ms: u64) -> Result<Self, SimulationError> {
        if !speed_mps.is_finite() || speed_mps <= 0.0 {
            return Err(SimulationError::InvalidMotion(format!(
                "speed must be a positive number of meters per second, got {}",
                speed_mps
            )));
        }
        if step_interval_ms == 0 {
            return Err(SimulationError::InvalidMotion(
                "step interval must be at least 1 ms".to_string(),
            ));
        }
        Ok(Self {
            speed_mps,
            step_interval_ms,
        })
    }

    pub fn step_interval_ms(&self) -> u64 {
        self.step_interval_ms
    }

    pub fn distance_per_step(&self) -> f64 {
        self.speed_mps * self.step_interval_ms as f64 / 1000.0
    }

    pub fn eta_seconds(&self, remaining_distance_m: f64) -> u64 {
        (remaining_distance_m.max(0.0) / self.speed_mps).round() as u64
    }
}

/// State at the moment the route resolves: parked on the first waypoint with
/// the full distance ahead.
pub fn initial_state(route: &Route, motion: &MotionConfig) -> Result<MoverState, SimulationError> {
    if route.len() < 2 {
        return Err(SimulationError::InsufficientGeometry(route.len()));
    }
    if let Some(idx) = route.first_invalid_waypoint() {
        return Err(SimulationError::InvalidGeometry(idx));
    }
    if !route.distance_m.is_finite() {
        return Err(SimulationError::InvalidDistance(route.distance_m));
    }
    let remaining_distance_m = route.distance_m.max(0.0);
    Ok(MoverState {
        position: route.coordinates[0],
        segment_index: 0,
        remaining_distance_m,
        eta_seconds: motion.eta_seconds(remaining_distance_m),
    })
}

/// Advances the mover by one tick.
///
/// A tick crosses at most one waypoint: when the next waypoint is within this
/// tick's budget the mover snaps onto it and the rest of the budget is dropped.
/// Distance and ETA only change on interpolating ticks. Once the last waypoint
/// is reached the following tick reports arrival with nothing left to go.
pub fn step(state: &MoverState, route: &Route, motion: &MotionConfig) -> MoverEvent {
    let last = route.last_index();
    let next = match route.coordinates.get(state.segment_index + 1) {
        Some(next) if state.segment_index < last => *next,
        _ => {
            return MoverEvent::Arrived(MoverState {
                position: route.coordinates.get(last).copied().unwrap_or(state.position),
                segment_index: last,
                remaining_distance_m: 0.0,
                eta_seconds: 0,
            })
        }
    };

    let budget = motion.distance_per_step();
    let segment_distance = state.position.distance_to(&next);

    if segment_distance <= budget {
        return MoverEvent::Snap(MoverState {
            position: next,
            segment_index: state.segment_index + 1,
            ..*state
        });
    }

    let remaining_distance_m = (state.remaining_distance_m - budget).max(0.0);
    MoverEvent::Step(MoverState {
        position: state.position.lerp(&next, budget / segment_distance),
        segment_index: state.segment_index,
        remaining_distance_m,
        eta_seconds: motion.eta_seconds(remaining_distance_m).min(state.eta_seconds),
    })
}

/// Lazily replays a route tick by tick. Yields every step, snap and the final
/// arrival, then ends.
#[derive(Debug, Clone)]
pub struct Interpolator {
    route: Route,
    motion: MotionConfig,
    state: MoverState,
    done: bool,
}

impl Interpolator {
    pub fn new(route: Route, motion: MotionConfig) -> Result<Self, SimulationError> {
        let state = initial_state(&route, &motion)?;
        Ok(Self {
            route,
            motion,
            state,
            done: false,
        })
    }

    pub fn state(&self) -> &MoverState {
        &self.state
    }
}

impl Iterator for Interpolator {
    type Item = MoverEvent;

    fn next(&mut self) -> Option<MoverEvent> {
        if self.done {
            return None;
        }
        let event = step(&self.state, &self.route, &self.motion);
        self.state = *event.state();
        if matches!(event, MoverEvent::Arrived(_)) {
            self.done = true;
        }
        Some(event)
    }
}
