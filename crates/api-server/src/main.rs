//! API server for the task tracker
//!
//! Serves the owner-scoped task CRUD REST API.

mod auth;
mod routes;
mod state;
mod upload;

use axum::Router;
use std::net::SocketAddr;
use std::path::PathBuf;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::state::AppState;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine data and upload directories
    let data_dir = std::env::var("TT_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(".tt-data"));
    let upload_dir = std::env::var("TT_UPLOAD_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| data_dir.join("uploads"));

    tracing::info!("Using data directory: {:?}", data_dir);
    tracing::info!("Using upload directory: {:?}", upload_dir);

    // Create application state
    let app_state = AppState::new(data_dir, upload_dir)
        .await
        .expect("Failed to initialize application state");

    let app = Router::new()
        .merge(routes::health::router())
        .merge(routes::task::router())
        .with_state(app_state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    let port: u16 = std::env::var("TT_PORT")
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(8081);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!("REST API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
