use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header::CONTENT_TYPE, HeaderMap, Method},
    routing::any,
    Router,
};
use bytes::Bytes;

use crate::models::AppState;
use crate::upload::{handle_upload, ApiResult, InboundRequest};

/// Every method is routed to the handler so that non-POST requests get the
/// pipeline's JSON 405 instead of an empty one.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/.netlify/functions/upload", any(upload))
        .route("/api/upload", any(upload))
        .layer(DefaultBodyLimit::disable())
        .with_state(state)
}

async fn upload(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let request = InboundRequest {
        method,
        content_type,
        body,
        is_base64_encoded: false,
    };

    handle_upload(&state, request).await
}
