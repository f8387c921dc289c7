use bus_eta::{config::Config, state::AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bus_eta=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    let state = AppState::new(config.clone())?;

    // Start trip eviction task
    let eviction_state = state.clone();
    let eviction_ttl = config.trip_ttl;
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(tokio::time::Duration::from_secs(300)).await; // Every 5 minutes
            eviction_state.evict_expired(eviction_ttl);
        }
    });

    let app = bus_eta::app(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("bus-eta listening on {}", addr);
    tracing::info!("Routing via {}", config.osrm_base_url);
    tracing::info!("Health check: http://{}/health", addr);
    tracing::info!("Plan: GET http://{}/api/plan", addr);
    tracing::info!("Trips: POST http://{}/api/trips", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
