use crate::config::Config;
use crate::error::AppError;
use crate::pipeline::cancel::CancelToken;
use crate::pipeline::interpolate::MotionConfig;
use crate::pipeline::osrm::OsrmClient;
use crate::pipeline::plan::bus_start;
use crate::pipeline::schedule::{self, MoverObserver, RunOutcome};
use crate::pipeline::source::{GeometrySource, StaticSource};
use crate::types::geo::Route;
use crate::types::mover::{FailureKind, MoverPhase, MoverState};
use crate::types::trip::{TripEndpoints, TripSnapshot};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use uuid::Uuid;

#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    motion: MotionConfig,
    source: Arc<dyn GeometrySource>,
    trips: Arc<DashMap<String, TripSession>>,
}

struct TripSession {
    snapshot: watch::Receiver<TripSnapshot>,
    cancel: CancelToken,
    started_at: Instant,
}

/// Feeds a trip's progress into the watch channel its session reads from.
struct SnapshotObserver {
    tx: watch::Sender<TripSnapshot>,
}

impl MoverObserver for SnapshotObserver {
    fn on_update(&self, phase: MoverPhase, state: &MoverState) {
        self.tx.send_modify(|snapshot| *snapshot = snapshot.with_update(phase, state));
    }

    fn on_failure(&self, kind: FailureKind) {
        self.tx.send_modify(|snapshot| *snapshot = snapshot.with_failure(kind));
    }
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, AppError> {
        let source = OsrmClient::new(&config.osrm_base_url, config.route_timeout)?;
        Self::with_source(config, Arc::new(source))
    }

    pub fn with_source(config: Config, source: Arc<dyn GeometrySource>) -> Result<Self, AppError> {
        let motion = config.motion()?;
        Ok(Self {
            config: Arc::new(config),
            motion,
            source,
            trips: Arc::new(DashMap::new()),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn source(&self) -> &dyn GeometrySource {
        self.source.as_ref()
    }

    /// Starts simulating the bus from the second closest stop to the rider and
    /// returns the new trip's id. A route the caller already resolved is
    /// animated as is; otherwise the geometry source is asked once.
    pub fn start_trip(&self, endpoints: TripEndpoints, approach: Option<Route>) -> String {
        let trip_id = Uuid::new_v4().to_string();
        let (tx, rx) = watch::channel(TripSnapshot::pending(&trip_id));
        let cancel = CancelToken::new();

        self.trips.insert(
            trip_id.clone(),
            TripSession {
                snapshot: rx,
                cancel: cancel.clone(),
                started_at: Instant::now(),
            },
        );

        let source: Arc<dyn GeometrySource> = match approach {
            Some(route) => Arc::new(StaticSource::new(route)),
            None => self.source.clone(),
        };
        let motion = self.motion;
        let id = trip_id.clone();
        tokio::spawn(async move {
            let observer = SnapshotObserver { tx };
            let outcome = schedule::run_trip(
                source.as_ref(),
                bus_start(endpoints.origin),
                endpoints.origin,
                motion,
                &observer,
                &cancel,
            )
            .await;
            match outcome {
                RunOutcome::Arrived => tracing::info!("Trip {} arrived", id),
                RunOutcome::Failed(kind) => tracing::warn!("Trip {} failed: {:?}", id, kind),
                RunOutcome::Cancelled => tracing::info!("Trip {} cancelled", id),
            }
        });

        trip_id
    }

    pub fn snapshot(&self, trip_id: &str) -> Option<TripSnapshot> {
        self.trips
            .get(trip_id)
            .map(|session| session.snapshot.borrow().clone())
    }

    /// Stops and forgets a trip. Returns false if it was unknown.
    pub fn cancel_trip(&self, trip_id: &str) -> bool {
        match self.trips.remove(trip_id) {
            Some((_, session)) => {
                session.cancel.cancel();
                true
            }
            None => false,
        }
    }

    pub fn trip_count(&self) -> usize {
        self.trips.len()
    }

    pub fn evict_expired(&self, ttl: Duration) {
        let now = Instant::now();
        self.trips.retain(|_, session| {
            let keep = now.duration_since(session.started_at) < ttl;
            if !keep {
                session.cancel.cancel();
            }
            keep
        });
        tracing::info!("Trip eviction complete. Current size: {}", self.trips.len());
    }
}
