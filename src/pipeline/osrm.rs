use std::time::Duration;

use serde::Deserialize;

use crate::error::RouteError;
use crate::pipeline::source::{GeometrySource, RouteFuture};
use crate::types::geo::{Coordinate, Route};

/// Client for the OSRM `route/v1/driving` endpoint.
#[derive(Debug, Clone)]
pub struct OsrmClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct OsrmResponse {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    distance: f64,
    geometry: OsrmGeometry,
}

#[derive(Debug, Deserialize)]
struct OsrmGeometry {
    /// GeoJSON order: `[lon, lat]`.
    coordinates: Vec<[f64; 2]>,
}

impl OsrmClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RouteError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| RouteError::Unavailable(format!("Failed to build HTTP client: {}", err)))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn route_url(&self, from: Coordinate, to: Coordinate) -> String {
        format!(
            "{}/route/v1/driving/{},{};{},{}?overview=full&geometries=geojson",
            self.base_url, from.lon, from.lat, to.lon, to.lat
        )
    }

    async fn fetch(&self, from: Coordinate, to: Coordinate) -> Result<Route, RouteError> {
        let url = self.route_url(from, to);
        tracing::debug!("Requesting route: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| RouteError::Unavailable(format!("Route request failed: {}", err)))?;

        let status = response.status();
        // OSRM answers "no route" style errors with a 400 and a JSON body, so the
        // body is decoded before looking at the status.
        let body = response
            .text()
            .await
            .map_err(|err| RouteError::Unavailable(format!("Failed to read route response: {}", err)))?;
        let payload: OsrmResponse = serde_json::from_str(&body).map_err(|err| {
            if status.is_success() {
                RouteError::Unavailable(format!("Invalid route response: {}", err))
            } else {
                RouteError::Unavailable(format!("Routing service returned {}", status))
            }
        })?;

        parse_route(payload)
    }
}

impl GeometrySource for OsrmClient {
    fn resolve_route(&self, from: Coordinate, to: Coordinate) -> RouteFuture<'_> {
        Box::pin(self.fetch(from, to))
    }
}

fn parse_route(payload: OsrmResponse) -> Result<Route, RouteError> {
    match payload.code.as_deref() {
        None | Some("Ok") => {}
        Some("NoRoute") | Some("NoSegment") => return Err(RouteError::NoRoute),
        Some(code) => {
            return Err(RouteError::Unavailable(format!(
                "{}: {}",
                code,
                payload.message.unwrap_or_default()
            )))
        }
    }

    let route = payload.routes.into_iter().next().ok_or(RouteError::NoRoute)?;
    let coordinates = route
        .geometry
        .coordinates
        .into_iter()
        .map(|[lon, lat]| Coordinate::new(lat, lon))
        .collect();

    let route = Route::new(coordinates, route.distance);
    if let Some(idx) = route.first_invalid_waypoint() {
        return Err(RouteError::Unavailable(format!(
            "Route geometry has an invalid coordinate at index {}",
            idx
        )));
    }
    if !route.has_valid_geometry() {
        return Err(RouteError::Unavailable(format!(
            "Route distance is not a usable number: {}",
            route.distance_m
        )));
    }

    Ok(route)
}
