use crate::error::RouteError;
use crate::pipeline::source::GeometrySource;
use crate::types::geo::{Coordinate, Route};
use crate::types::trip::{BusStop, Marker, MarkerKind, Polyline, TripEndpoints, TripPlan};

const CLOSEST_STOP_OFFSET: (f64, f64) = (0.005, 0.005);
const SECOND_STOP_OFFSET: (f64, f64) = (0.01, -0.01);
const ROUTE_WEIGHT: u32 = 4;
const ROUTE_OPACITY: f64 = 0.7;

/// Stops near the rider, closest first. Positions are fixed offsets from the origin.
pub fn nearby_stops(origin: Coordinate) -> Vec<BusStop> {
    vec![
        BusStop {
            name: "Closest Bus Stop".to_string(),
            position: origin.offset(CLOSEST_STOP_OFFSET.0, CLOSEST_STOP_OFFSET.1),
        },
        BusStop {
            name: "Second Closest Bus Stop".to_string(),
            position: origin.offset(SECOND_STOP_OFFSET.0, SECOND_STOP_OFFSET.1),
        },
    ]
}

/// Where the bus sets off from.
pub fn bus_start(origin: Coordinate) -> Coordinate {
    origin.offset(SECOND_STOP_OFFSET.0, SECOND_STOP_OFFSET.1)
}

pub async fn plan_trip(
    source: &dyn GeometrySource,
    endpoints: TripEndpoints,
) -> Result<TripPlan, RouteError> {
    let start = bus_start(endpoints.origin);
    let (approach, journey) = tokio::try_join!(
        source.resolve_route(start, endpoints.origin),
        source.resolve_route(endpoints.origin, endpoints.destination),
    )?;

    tracing::info!(
        "Planned trip: bus approach {:.0} m ({} points), rider journey {:.0} m ({} points)",
        approach.distance_m,
        approach.len(),
        journey.distance_m,
        journey.len()
    );

    Ok(build_plan(endpoints, approach, journey))
}

pub fn build_plan(endpoints: TripEndpoints, approach: Route, journey: Route) -> TripPlan {
    let stops = nearby_stops(endpoints.origin);
    let start = bus_start(endpoints.origin);

    let markers = vec![
        Marker {
            kind: MarkerKind::Rider,
            label: "Your Location".to_string(),
            position: endpoints.origin,
        },
        Marker {
            kind: MarkerKind::Destination,
            label: "Destination".to_string(),
            position: endpoints.destination,
        },
        Marker {
            kind: MarkerKind::Stop,
            label: "Second Closest Bus Stop".to_string(),
            position: start,
        },
        Marker {
            kind: MarkerKind::Bus,
            label: "Bus".to_string(),
            position: approach.coordinates.first().copied().unwrap_or(start),
        },
    ];

    TripPlan {
        endpoints,
        stops,
        markers,
        polylines: vec![polyline("red", approach), polyline("blue", journey)],
    }
}

fn polyline(color: &str, route: Route) -> Polyline {
    Polyline {
        color: color.to_string(),
        weight: ROUTE_WEIGHT,
        opacity: ROUTE_OPACITY,
        route,
    }
}
