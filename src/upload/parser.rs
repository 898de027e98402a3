// Decoding of the inbound multipart/form-data body

use std::convert::Infallible;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use futures::stream;
use tracing::debug;

use crate::models::{FilePart, ParsedForm};
use crate::types::{AppError, AppResult};

/// Undo the base64 transport encoding some serverless platforms apply to
/// binary request bodies.
pub fn decode_body(body: Bytes, is_base64_encoded: bool) -> AppResult<Bytes> {
    if !is_base64_encoded {
        return Ok(body);
    }

    let trimmed = body.trim_ascii();
    STANDARD
        .decode(trimmed)
        .map(Bytes::from)
        .map_err(|e| AppError::bad_request(format!("Request body is not valid base64: {}", e)))
}

/// Split a multipart body into text fields and file parts.
///
/// A part carrying a `filename` parameter is treated as a file; every other
/// part is a text field. Later parts overwrite earlier ones of the same name.
pub async fn parse_multipart(content_type: &str, body: Bytes) -> AppResult<ParsedForm> {
    let boundary = multer::parse_boundary(content_type).map_err(|e| {
        AppError::bad_request(format!("Content-Type is not multipart/form-data: {}", e))
    })?;

    let body_stream = stream::once(async move { Ok::<Bytes, Infallible>(body) });
    let mut multipart = multer::Multipart::new(body_stream, boundary);
    let mut form = ParsedForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::MalformedMultipart(e.to_string()))?
    {
        let name = field.name().map(str::to_string).ok_or_else(|| {
            AppError::MalformedMultipart(
                "part has no `name` parameter in its Content-Disposition header".to_string(),
            )
        })?;

        match field.file_name().map(str::to_string) {
            Some(filename) => {
                let content_type = field
                    .content_type()
                    .map(|mime| mime.to_string())
                    .unwrap_or_default();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::MalformedMultipart(e.to_string()))?;

                debug!(field = %name, filename = %filename, size = data.len(), "Parsed file part");
                form.files.insert(
                    name,
                    FilePart {
                        filename,
                        content_type,
                        data,
                    },
                );
            }
            None => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::MalformedMultipart(e.to_string()))?;
                form.fields.insert(name, value);
            }
        }
    }

    Ok(form)
}
