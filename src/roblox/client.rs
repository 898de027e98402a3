use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::config::UpstreamConfig;
use crate::models::UploadRequest;
use crate::types::{AppError, AppResult};

/// The only asset type this relay creates
pub const ASSET_TYPE: &str = "TShirt";

const API_KEY_HEADER: &str = "x-api-key";

// Request types for the asset API
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AssetRequest<'a> {
    asset_type: &'static str,
    display_name: Option<&'a str>,
    description: Option<&'a str>,
    creation_context: CreationContext,
}

#[derive(Debug, Serialize)]
struct CreationContext {
    creator: Creator,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Creator {
    user_id: i64,
}

/// Status of an asset operation as reported by the operations endpoint
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationStatus {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub response: Option<OperationResponse>,
    /// Payload exactly as received, returned to the caller for diagnostics
    #[serde(skip)]
    pub raw: Value,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationResponse {
    #[serde(default)]
    pub asset_id: Option<Value>,
}

impl OperationStatus {
    pub fn from_payload(payload: Value) -> AppResult<Self> {
        let mut status: OperationStatus = serde_json::from_value(payload.clone())?;
        status.raw = payload;
        Ok(status)
    }

    /// Asset id of a finished operation; null, empty and zero ids count as absent
    pub fn asset_id(&self) -> Option<&Value> {
        self.response
            .as_ref()
            .and_then(|r| r.asset_id.as_ref())
            .filter(|id| match id {
                Value::Null => false,
                Value::String(s) => !s.is_empty(),
                Value::Number(n) => n.as_f64() != Some(0.0),
                Value::Bool(b) => *b,
                Value::Array(a) => !a.is_empty(),
                Value::Object(o) => !o.is_empty(),
            })
    }
}

#[derive(Clone)]
pub struct AssetsClient {
    http: Client,
    base_url: String,
}

impl AssetsClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn assets_url(&self) -> String {
        format!("{}/assets/v1/assets", self.base_url)
    }

    fn operation_url(&self, operation_id: &str) -> String {
        format!("{}/assets/v1/operations/{}", self.base_url, operation_id)
    }

    /// Start an asset upload and return the id of the operation tracking it.
    ///
    /// Anything other than a 200 carrying a non-empty `operationId` is a
    /// rejection; the response body is kept (as JSON, or as a JSON string when
    /// it does not parse) so the caller can see what the API said.
    pub async fn create_asset(&self, upload: &UploadRequest) -> AppResult<String> {
        let metadata = AssetRequest {
            asset_type: ASSET_TYPE,
            display_name: upload.display_name.as_deref(),
            description: upload.description.as_deref(),
            creation_context: CreationContext {
                creator: Creator {
                    user_id: upload.user_id,
                },
            },
        };

        let request_part = Part::text(serde_json::to_string(&metadata)?)
            .mime_str(mime::APPLICATION_JSON.as_ref())?;

        let file_mime = upload
            .file
            .content_type
            .parse::<mime::Mime>()
            .unwrap_or(mime::APPLICATION_OCTET_STREAM);
        let file_part = Part::bytes(upload.file.data.to_vec())
            .file_name(upload.file.filename.clone())
            .mime_str(file_mime.as_ref())?;

        let form = Form::new()
            .part("request", request_part)
            .part("fileContent", file_part);

        debug!(
            user_id = upload.user_id,
            filename = %upload.file.filename,
            size = upload.file.data.len(),
            "Sending asset upload"
        );

        let response = self
            .http
            .post(self.assets_url())
            .header(API_KEY_HEADER, &upload.api_key)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        let body: Value = serde_json::from_str(&text).unwrap_or_else(|_| Value::String(text));

        let operation_id = body
            .get("operationId")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .map(str::to_string);

        match operation_id {
            Some(operation_id) if status == StatusCode::OK => {
                info!(operation_id = %operation_id, "Asset upload accepted");
                Ok(operation_id)
            }
            _ => Err(AppError::UpstreamRejected { status, body }),
        }
    }

    /// Fetch the current status of an operation. Transport failures, error
    /// statuses and undecodable payloads are all returned as errors.
    pub async fn get_operation(&self, api_key: &str, operation_id: &str) -> AppResult<OperationStatus> {
        let payload: Value = self
            .http
            .get(self.operation_url(operation_id))
            .header(API_KEY_HEADER, api_key)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        OperationStatus::from_payload(payload)
    }
}
