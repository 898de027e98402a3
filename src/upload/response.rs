// Translation of pipeline outcomes into status codes and JSON bodies

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use crate::models::UploadSuccess;
use crate::types::AppError;

pub const MSG_UPLOAD_SUCCEEDED: &str = "Upload succeeded!";

/// The single value handed back to the caller of the upload endpoint
#[derive(Debug)]
pub enum ApiResult {
    Success(UploadSuccess),
    Failure(AppError),
}

impl ApiResult {
    /// Wrap a failure, logging it at a level matching who is at fault
    pub fn failure(err: AppError) -> Self {
        err.log();
        ApiResult::Failure(err)
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiResult::Success(_) => StatusCode::OK,
            ApiResult::Failure(err) => err.status_code(),
        }
    }

    pub fn body(&self) -> Value {
        match self {
            ApiResult::Success(success) => json!({
                "status": "success",
                "message": MSG_UPLOAD_SUCCEEDED,
                "assetId": success.asset_id,
                "operationId": success.operation_id,
                "name": success.name,
                "description": success.description,
            }),
            ApiResult::Failure(err) => err.body(),
        }
    }
}

impl From<Result<UploadSuccess, AppError>> for ApiResult {
    fn from(result: Result<UploadSuccess, AppError>) -> Self {
        match result {
            Ok(success) => ApiResult::Success(success),
            Err(err) => ApiResult::failure(err),
        }
    }
}

impl IntoResponse for ApiResult {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.body())).into_response()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        ApiResult::failure(self).into_response()
    }
}
