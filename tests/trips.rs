use std::sync::Arc;
use std::time::Duration;

use axum::{body::to_bytes, http::Request, http::StatusCode, Router};
use bus_eta::{
    config::Config,
    pipeline::source::StaticSource,
    state::AppState,
    types::geo::{Coordinate, Route},
};
use serde_json::Value;
use tower::ServiceExt;

const QUERY: &str = "originLat=52.52&originLon=13.405&destLat=52.5&destLon=13.37";

fn fast_config() -> Config {
    Config {
        bus_speed_mps: 1000.0,
        step_interval_ms: 1,
        ..Config::default()
    }
}

fn short_route() -> Route {
    // ~22 m, so about twenty 1 m ticks.
    Route::from_waypoints(vec![
        Coordinate::new(52.53, 13.395),
        Coordinate::new(52.53, 13.3952),
        Coordinate::new(52.5301, 13.3952),
    ])
}

fn app_with(source: StaticSource) -> Router {
    let state = AppState::with_source(fast_config(), Arc::new(source)).expect("state");
    bus_eta::app(state)
}

async fn send(app: &Router, method: &str, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(uri)
                .method(method)
                .body(axum::body::Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("json")
    };
    (status, json)
}

async fn post_route(app: &Router, route: &Route) -> (StatusCode, Value) {
    let body = serde_json::json!({ "route": route }).to_string();
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/trips?{QUERY}"))
                .method("POST")
                .header("content-type", "application/json")
                .body(axum::body::Body::from(body))
                .expect("request"),
        )
        .await
        .expect("response");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    (status, serde_json::from_slice(&body).expect("json"))
}

async fn wait_for_terminal(app: &Router, trip_id: &str) -> Value {
    for _ in 0..500 {
        let (status, snapshot) = send(app, "GET", &format!("/api/trips/{trip_id}")).await;
        assert_eq!(status, StatusCode::OK);
        if snapshot["phase"] == "arrived" || snapshot["phase"] == "failed" {
            return snapshot;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("trip {trip_id} never finished");
}

#[tokio::test]
async fn plan_returns_markers_and_both_routes() {
    let app = app_with(StaticSource::new(short_route()));
    let (status, plan) = send(&app, "GET", &format!("/api/plan?{QUERY}")).await;
    assert_eq!(status, StatusCode::OK);

    let markers = plan["markers"].as_array().expect("markers");
    assert_eq!(markers.len(), 4);
    assert_eq!(markers[0]["label"], "Your Location");
    let polylines = plan["polylines"].as_array().expect("polylines");
    assert_eq!(polylines[0]["color"], "red");
    assert_eq!(polylines[1]["color"], "blue");
    assert_eq!(polylines[0]["route"]["coordinates"].as_array().map(Vec::len), Some(3));
}

#[tokio::test]
async fn invalid_locations_are_rejected() {
    let app = app_with(StaticSource::new(short_route()));
    for uri in [
        "/api/plan?originLat=abc&originLon=13.405&destLat=52.5&destLon=13.37",
        "/api/plan",
    ] {
        let (status, json) = send(&app, "GET", uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            json["error"],
            "Invalid location data. Please go back and enter valid locations."
        );
    }
    let (status, _) = send(&app, "POST", "/api/trips?originLat=1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn plan_reports_bad_gateway_without_a_route() {
    let app = app_with(StaticSource::unavailable());
    let (status, json) = send(&app, "GET", &format!("/api/plan?{QUERY}")).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["error"], "No route found");
}

#[tokio::test]
async fn trip_runs_to_arrival() {
    let app = app_with(StaticSource::new(short_route()));
    let (status, started) = send(&app, "POST", &format!("/api/trips?{QUERY}")).await;
    assert_eq!(status, StatusCode::CREATED);
    let trip_id = started["trip_id"].as_str().expect("trip id").to_string();

    let snapshot = wait_for_terminal(&app, &trip_id).await;
    assert_eq!(snapshot["phase"], "arrived");
    assert_eq!(snapshot["eta_text"], "Bus has arrived!");
    assert_eq!(snapshot["eta_seconds"], 0);
    assert_eq!(snapshot["segment_index"], 2);
    assert_eq!(snapshot["remaining_distance_m"], 0.0);
    assert_eq!(snapshot["position"]["lat"], 52.5301);
    assert!(snapshot.get("state").is_none());
}

#[tokio::test]
async fn trip_without_route_fails_once() {
    let app = app_with(StaticSource::unavailable());
    let (_, started) = send(&app, "POST", &format!("/api/trips?{QUERY}")).await;
    let trip_id = started["trip_id"].as_str().expect("trip id").to_string();

    let snapshot = wait_for_terminal(&app, &trip_id).await;
    assert_eq!(snapshot["phase"], "failed");
    assert_eq!(snapshot["failure"], "source_unavailable");
    assert_eq!(snapshot["eta_text"], "No route found.");
    assert!(snapshot.get("position").is_none());
}

#[tokio::test]
async fn single_point_route_fails_with_insufficient_geometry() {
    let route = Route::new(vec![Coordinate::new(52.53, 13.395)], 0.0);
    let app = app_with(StaticSource::new(route));
    let (_, started) = send(&app, "POST", &format!("/api/trips?{QUERY}")).await;
    let trip_id = started["trip_id"].as_str().expect("trip id").to_string();

    let snapshot = wait_for_terminal(&app, &trip_id).await;
    assert_eq!(snapshot["failure"], "insufficient_geometry");
}

#[tokio::test]
async fn cancelled_trip_is_gone() {
    let long_route = Route::from_waypoints(vec![Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 1.0)]);
    let app = app_with(StaticSource::new(long_route));
    let (_, started) = send(&app, "POST", &format!("/api/trips?{QUERY}")).await;
    let trip_id = started["trip_id"].as_str().expect("trip id").to_string();

    let (status, _) = send(&app, "DELETE", &format!("/api/trips/{trip_id}")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "GET", &format!("/api/trips/{trip_id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "DELETE", &format!("/api/trips/{trip_id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn planned_route_is_animated_without_a_second_lookup() {
    // The source cannot resolve anything, so arrival proves the posted route was used.
    let app = app_with(StaticSource::unavailable());
    let (status, started) = post_route(&app, &short_route()).await;
    assert_eq!(status, StatusCode::CREATED);
    let trip_id = started["trip_id"].as_str().expect("trip id").to_string();

    let snapshot = wait_for_terminal(&app, &trip_id).await;
    assert_eq!(snapshot["phase"], "arrived");
    assert_eq!(snapshot["position"]["lat"], 52.5301);
}

#[tokio::test]
async fn unusable_planned_route_is_rejected() {
    let app = app_with(StaticSource::new(short_route()));

    let single = Route::new(vec![Coordinate::new(52.53, 13.395)], 0.0);
    let (status, json) = post_route(&app, &single).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Invalid route geometry");

    let out_of_range = Route::new(
        vec![Coordinate::new(52.53, 13.395), Coordinate::new(95.0, 13.395)],
        100.0,
    );
    let (status, _) = post_route(&app, &out_of_range).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
