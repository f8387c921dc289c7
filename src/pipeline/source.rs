use std::future::Future;
use std::pin::Pin;

use crate::error::RouteError;
use crate::types::geo::{Coordinate, Route};

pub type RouteFuture<'a> = Pin<Box<dyn Future<Output = Result<Route, RouteError>> + Send + 'a>>;

/// Anything that can turn two points into a drivable polyline.
pub trait GeometrySource: Send + Sync {
    fn resolve_route(&self, from: Coordinate, to: Coordinate) -> RouteFuture<'_>;
}

/// Answers every lookup with the same route, or with the same failure.
#[derive(Debug, Clone)]
pub struct StaticSource {
    route: Option<Route>,
}

impl StaticSource {
    pub fn new(route: Route) -> Self {
        Self { route: Some(route) }
    }

    pub fn unavailable() -> Self {
        Self { route: None }
    }
}

impl GeometrySource for StaticSource {
    fn resolve_route(&self, _from: Coordinate, _to: Coordinate) -> RouteFuture<'_> {
        let route = self.route.clone();
        Box::pin(async move { route.ok_or(RouteError::NoRoute) })
    }
}
