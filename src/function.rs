//! Serverless function adapter
//!
//! Accepts the event shape delivered by function platforms (method, headers,
//! body text and a base64 flag) and produces the matching response shape, so
//! the same pipeline can run behind a function runtime or from the CLI.

use std::collections::HashMap;

use axum::http::Method;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::models::AppState;
use crate::types::AppError;
use crate::upload::{handle_upload, ApiResult, InboundRequest};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionEvent {
    pub http_method: String,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub is_base64_encoded: bool,
}

impl FunctionEvent {
    /// Header lookup ignoring case, as platforms differ in how they send them
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionResponse {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl From<ApiResult> for FunctionResponse {
    fn from(result: ApiResult) -> Self {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());

        Self {
            status_code: result.status_code().as_u16(),
            headers,
            body: result.body().to_string(),
        }
    }
}

pub async fn handle_event(state: &AppState, event: FunctionEvent) -> FunctionResponse {
    let Ok(method) = Method::from_bytes(event.http_method.to_ascii_uppercase().as_bytes()) else {
        return ApiResult::failure(AppError::MethodNotAllowed).into();
    };

    let request = InboundRequest {
        method,
        content_type: event.header("content-type").map(str::to_string),
        body: Bytes::from(event.body.clone().unwrap_or_default()),
        is_base64_encoded: event.is_base64_encoded,
    };

    handle_upload(state, request).await.into()
}
