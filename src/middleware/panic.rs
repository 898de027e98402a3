use std::any::Any;

use axum::response::{IntoResponse, Response};

use crate::types::AppError;

/// Render a handler panic as the usual JSON 500 body
pub fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unknown panic".to_string()
    };

    AppError::UnexpectedFailure(message).into_response()
}
