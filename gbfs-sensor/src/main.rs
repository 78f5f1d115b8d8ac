use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gbfs_sensor::config::Config;
use gbfs_sensor::feed::{FeedClient, FeedFetcher};
use gbfs_sensor::scheduler::{Scheduler, SensorBoard};
use gbfs_sensor::stations::StationRegistry;
use gbfs_sensor::web::{AppState, create_router};

/// Config file read when `GBFS_CONFIG` is unset.
const DEFAULT_CONFIG_PATH: &str = "gbfs.toml";

/// Listen address used when `BIND_ADDR` is unset.
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("{}=info,tower_http=info", env!("CARGO_CRATE_NAME")).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_path =
        std::env::var("GBFS_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = Config::load(&config_path).expect("Failed to load configuration");
    tracing::info!(
        path = %config_path,
        stations = config.stations.len(),
        "loaded configuration"
    );

    // One fetcher shared by every sensor
    let client = FeedClient::new(config.client_config()).expect("Failed to create feed client");
    let registry = StationRegistry::new();
    let fetcher = Arc::new(FeedFetcher::new(
        client,
        registry.clone(),
        config.fetcher_config(),
    ));

    let board = SensorBoard::new();
    let scheduler = Scheduler::from_config(&config, fetcher, board.clone());
    tokio::spawn(scheduler.run());

    let app = create_router(AppState::new(board, registry));

    let addr: SocketAddr = std::env::var("BIND_ADDR")
        .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
        .parse()
        .expect("Invalid BIND_ADDR");

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    tracing::info!("listening on http://{addr}");
    println!("API Endpoints:");
    println!("  GET  /health         - Health check");
    println!("  GET  /sensors        - All sensor states");
    println!("  GET  /sensors/:name  - One sensor state");
    println!("  GET  /stations/:id   - Merged station record");

    axum::serve(listener, app).await.unwrap();
}
