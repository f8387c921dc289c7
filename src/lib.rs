pub mod config;
pub mod error;
pub mod pipeline;
pub mod routes;
pub mod state;
pub mod types;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

pub fn app(state: state::AppState) -> Router {
    let serve_dir = ServeDir::new("assets/web")
        .not_found_service(ServeFile::new("assets/web/index.html"));

    Router::new()
        .merge(routes::health::router())
        .merge(routes::trips::router())
        .fallback_service(serve_dir)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
