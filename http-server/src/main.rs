use axum::{
    Router,
    routing::{any, delete, get, post},
};
use engine::arcade::ArcadeRound;
use engine::clock::{Clock, SystemClock};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

mod middleware;
mod models;
mod routes;
mod websocket;

use models::FileStore;
use routes::arcade::{abandon_round, collect_coin, get_cooldown, start_round, tick_round};
use routes::leaderboard::{get_leaderboard, get_rank};
use routes::mining::{mining_status, start_mining, tick_mining};
use routes::wallet::{connect_wallet, get_profile};
use websocket::{NotificationManager, create_notification_manager, websocket_handler};

// Application state: live arcade rounds, the persistent player store, the
// wall clock, and the per-user notification channels
#[derive(Clone)]
pub struct AppState {
    pub rounds: Arc<Mutex<HashMap<String, ArcadeRound>>>,
    pub storage: FileStore,
    pub clock: Arc<dyn Clock>,
    pub notifications: NotificationManager,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // initialize tracing
    tracing_subscriber::fmt::init();

    // Open the player store
    let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| "./data".to_string());
    let storage = FileStore::open(&data_dir)?;
    tracing::info!("Player storage ready in {}", data_dir);

    let state = AppState {
        rounds: Arc::new(Mutex::new(HashMap::new())),
        storage,
        clock: Arc::new(SystemClock),
        notifications: create_notification_manager(),
    };

    // build our application with routes
    let app = Router::new()
        .route("/", get(root))
        .route("/wallet/connect", post(connect_wallet))
        .route("/profile", get(get_profile))
        .route("/mining/start", post(start_mining))
        .route("/mining/tick", post(tick_mining))
        .route("/mining/status", get(mining_status))
        .route("/arcade/start", post(start_round))
        .route("/arcade/tick", post(tick_round))
        .route("/arcade/collect", post(collect_coin))
        .route("/arcade", delete(abandon_round))
        .route("/arcade/cooldown", get(get_cooldown))
        .route("/leaderboard", get(get_leaderboard))
        .route("/leaderboard/rank", get(get_rank))
        .route("/health", get(health_check))
        .route("/notifications", any(websocket_handler))
        .layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
        .with_state(state);

    // run our app with hyper, listening globally
    let port = std::env::var("PORT").unwrap_or_else(|_| "6957".to_string());
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    tracing::info!("Server running on http://0.0.0.0:{}", port);
    axum::serve(listener, app).await?;

    Ok(())
}

// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

// Root endpoint
async fn root() -> &'static str {
    "Coin Catcher API - Use POST /wallet/connect to connect a wallet, POST /mining/start and /mining/tick to mine GCT, POST /arcade/start to play, WebSocket /notifications for real-time events"
}
