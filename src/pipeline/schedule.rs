use std::time::Duration;

use crate::error::SimulationError;
use crate::pipeline::cancel::CancelToken;
use crate::pipeline::interpolate::{Interpolator, MotionConfig};
use crate::pipeline::source::GeometrySource;
use crate::types::geo::{Coordinate, Route};
use crate::types::mover::{FailureKind, MoverEvent, MoverPhase, MoverState};

/// Read-only consumer of a running trip.
pub trait MoverObserver: Send + Sync {
    /// Called with the initial state, once per tick, and once on arrival.
    fn on_update(&self, phase: MoverPhase, state: &MoverState);
    /// Called at most once, and never after an update.
    fn on_failure(&self, kind: FailureKind);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Arrived,
    Failed(FailureKind),
    Cancelled,
}

/// Drives the interpolator on a one-shot delay that is re-armed after every
/// tick, so ticks never overlap and cadence is interval plus processing time.
pub async fn run(
    route: Route,
    motion: MotionConfig,
    observer: &dyn MoverObserver,
    cancel: &CancelToken,
) -> RunOutcome {
    let mut interpolator = match Interpolator::new(route, motion) {
        Ok(interpolator) => interpolator,
        Err(err) => {
            tracing::warn!("Not animating route: {}", err);
            return fail(observer, failure_kind(&err));
        }
    };

    if cancel.is_cancelled() {
        return RunOutcome::Cancelled;
    }
    observer.on_update(MoverPhase::Stepping, interpolator.state());

    let interval = Duration::from_millis(motion.step_interval_ms());
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return RunOutcome::Cancelled,
            _ = tokio::time::sleep(interval) => {}
        }

        let Some(event) = interpolator.next() else {
            return RunOutcome::Arrived;
        };
        observer.on_update(event.phase(), event.state());
        if let MoverEvent::Arrived(_) = event {
            return RunOutcome::Arrived;
        }
    }
}

/// Resolves the route once, then runs it. A failed lookup is reported as
/// `SourceUnavailable` and nothing is animated.
pub async fn run_trip(
    source: &dyn GeometrySource,
    from: Coordinate,
    to: Coordinate,
    motion: MotionConfig,
    observer: &dyn MoverObserver,
    cancel: &CancelToken,
) -> RunOutcome {
    let resolved = tokio::select! {
        biased;
        _ = cancel.cancelled() => return RunOutcome::Cancelled,
        resolved = source.resolve_route(from, to) => resolved,
    };

    match resolved {
        Ok(route) => run(route, motion, observer, cancel).await,
        Err(err) => {
            tracing::warn!("Error fetching route: {}", err);
            fail(observer, FailureKind::SourceUnavailable)
        }
    }
}

fn failure_kind(err: &SimulationError) -> FailureKind {
    err.failure_kind().unwrap_or(FailureKind::InsufficientGeometry)
}

fn fail(observer: &dyn MoverObserver, kind: FailureKind) -> RunOutcome {
    observer.on_failure(kind);
    RunOutcome::Failed(kind)
}
