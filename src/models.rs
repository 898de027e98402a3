use std::collections::HashMap;

use bytes::Bytes;
use serde::Serialize;

use crate::config::Config;
use crate::roblox::{AssetsClient, PollSettings};
use crate::types::{AppError, AppResult, MSG_MISSING_FIELDS};

/// Shared, read-only state of the relay.
///
/// `assets` and `polling` are built from `config` once in [`AppState::new`];
/// the pipeline reads only them, never `config.upstream` or `config.polling`.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub assets: AssetsClient,
    pub polling: PollSettings,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let assets = AssetsClient::new(&config.upstream)?;
        let polling = PollSettings::from(&config.polling);
        Ok(Self {
            config,
            assets,
            polling,
        })
    }

    /// Replace the effective poll settings, e.g. with sub-second values that
    /// `PollingConfig` cannot express. `config.polling` is left as loaded.
    pub fn with_polling(mut self, polling: PollSettings) -> Self {
        self.polling = polling;
        self
    }
}

/// A file part pulled out of the inbound multipart body
#[derive(Debug, Clone)]
pub struct FilePart {
    pub filename: String,
    /// Raw `Content-Type` of the part, empty when the client sent none
    pub content_type: String,
    pub data: Bytes,
}

/// Text fields and file parts of one multipart body, keyed by part name
#[derive(Debug, Default)]
pub struct ParsedForm {
    pub fields: HashMap<String, String>,
    pub files: HashMap<String, FilePart>,
}

/// Validated input of a single upload invocation
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub api_key: String,
    pub user_id: i64,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub file: FilePart,
}

impl UploadRequest {
    /// `apiKey`, `userId` and the `fileContent` file are required; the
    /// display name and description may be left out.
    pub fn from_form(mut form: ParsedForm) -> AppResult<Self> {
        let api_key = form.fields.remove("apiKey").filter(|v| !v.is_empty());
        let user_id = form.fields.remove("userId").filter(|v| !v.is_empty());
        let file = form.files.remove("fileContent");

        let (api_key, user_id, file) = match (api_key, user_id, file) {
            (Some(api_key), Some(user_id), Some(file)) => (api_key, user_id, file),
            _ => return Err(AppError::bad_request(MSG_MISSING_FIELDS)),
        };

        let user_id = user_id.trim().parse::<i64>().map_err(|_| {
            AppError::bad_request(format!("User ID must be an integer, got '{}'.", user_id))
        })?;

        Ok(Self {
            api_key,
            user_id,
            display_name: form.fields.remove("displayName"),
            description: form.fields.remove("description"),
            file,
        })
    }
}

/// Result of an upload that produced an asset
#[derive(Debug, Clone)]
pub struct UploadSuccess {
    pub asset_id: serde_json::Value,
    pub operation_id: String,
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub upstream: String,
}
