//! Upload pipeline
//!
//! One invocation runs strictly in order: parse the multipart body, forward
//! the file to the asset API, poll the returned operation, then translate the
//! outcome into an [`ApiResult`]. Nothing is retried except the polling.

pub mod parser;
pub mod response;

use axum::http::Method;
use bytes::Bytes;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::models::{AppState, UploadRequest, UploadSuccess};
use crate::roblox::{poll_operation, PollOutcome};
use crate::types::{AppError, AppResult, MSG_MISSING_CONTENT_TYPE};

pub use response::ApiResult;

/// Transport-independent view of an inbound request
#[derive(Debug, Clone)]
pub struct InboundRequest {
    pub method: Method,
    pub content_type: Option<String>,
    pub body: Bytes,
    pub is_base64_encoded: bool,
}

/// Run one upload request through the whole pipeline. Every failure is
/// folded into the returned [`ApiResult`].
pub async fn handle_upload(state: &AppState, request: InboundRequest) -> ApiResult {
    let invocation_id = Uuid::new_v4();
    let span = info_span!("upload", %invocation_id, method = %request.method);

    let result = run_pipeline(state, request).instrument(span).await;
    ApiResult::from(result)
}

async fn run_pipeline(state: &AppState, request: InboundRequest) -> AppResult<UploadSuccess> {
    if request.method != Method::POST {
        return Err(AppError::MethodNotAllowed);
    }

    let content_type = request
        .content_type
        .filter(|ct| !ct.trim().is_empty())
        .ok_or_else(|| AppError::bad_request(MSG_MISSING_CONTENT_TYPE))?;

    let body = parser::decode_body(request.body, request.is_base64_encoded)?;
    let form = parser::parse_multipart(&content_type, body).await?;
    let upload = UploadRequest::from_form(form)?;

    info!(
        user_id = upload.user_id,
        filename = %upload.file.filename,
        "Forwarding upload to asset API"
    );
    let operation_id = state.assets.create_asset(&upload).await?;

    match poll_operation(&state.assets, &upload.api_key, &operation_id, &state.polling).await {
        PollOutcome::Done(status) => match status.asset_id() {
            Some(asset_id) => {
                info!(operation_id = %operation_id, asset_id = %asset_id, "Upload completed");
                Ok(UploadSuccess {
                    asset_id: asset_id.clone(),
                    operation_id,
                    name: upload.display_name,
                    description: upload.description,
                })
            }
            None => Err(AppError::PollTimeout {
                last_payload: Some(status.raw),
            }),
        },
        PollOutcome::TimedOut { last_payload } => Err(AppError::PollTimeout { last_payload }),
    }
}
