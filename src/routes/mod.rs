//! API Routes
//!
//! - `/.netlify/functions/upload` and `/api/upload` - the upload relay (any method)
//! - `/api/health` - Health checks

pub mod health;
pub mod upload;

use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::middleware::{cors_layer, panic_response};
use crate::models::AppState;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    info!("Creating application router");

    let cors = cors_layer(&state.config.server.cors_allowed_origins);

    Router::new()
        .merge(upload::router(state.clone()))
        .merge(health::router(state))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
