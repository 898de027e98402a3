// Asset Upload Relay - forwards multipart uploads to the Roblox asset API and waits for them to finish

pub mod config;
pub mod models;
pub mod types;
pub mod roblox;    // Asset API client and operation poller
pub mod upload;    // Parse -> forward -> poll -> translate pipeline
pub mod function;  // Serverless function event adapter
pub mod routes;
pub mod middleware;
pub mod utils;

// Re-exports for convenience
pub use config::Config;
pub use models::AppState;
pub use types::{AppError, AppResult};

pub fn create_router(state: AppState) -> axum::Router {
    routes::create_router(state)
}
