use crate::services::form::FormError;
use crate::services::telegram::TelegramError;
use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

pub const METHOD_NOT_ALLOWED_MESSAGE: &str = "Method Not Allowed";
pub const CONFIG_MISSING_MESSAGE: &str =
    "Telegram configuration missing on server (Environment Variables). Check Vercel settings.";
pub const MISSING_PHOTOS_MESSAGE: &str = "Missing one or both credit card photos.";
pub const PROCESSING_FAILED_MESSAGE: &str =
    "Internal Server Error during file processing or Telegram transmission.";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Method Not Allowed")]
    MethodNotAllowed,

    #[error("Telegram configuration missing")]
    ConfigMissing,

    #[error("Missing one or both credit card photos")]
    MissingPhotos,

    #[error("Form error: {0}")]
    Form(#[from] FormError),

    #[error("Telegram error: {0}")]
    Telegram(#[from] TelegramError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::MethodNotAllowed => (StatusCode::METHOD_NOT_ALLOWED, METHOD_NOT_ALLOWED_MESSAGE),
            AppError::ConfigMissing => {
                tracing::error!("TELEGRAM_BOT_TOKEN or TELEGRAM_CHAT_ID is not set");
                (StatusCode::INTERNAL_SERVER_ERROR, CONFIG_MISSING_MESSAGE)
            }
            AppError::MissingPhotos => (StatusCode::BAD_REQUEST, MISSING_PHOTOS_MESSAGE),
            // Parse and transmission failures share one response body
            AppError::Form(e) => {
                tracing::error!("Telegram/Upload error (form): {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, PROCESSING_FAILED_MESSAGE)
            }
            AppError::Telegram(e) => {
                tracing::error!("Telegram/Upload error (transmission): {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, PROCESSING_FAILED_MESSAGE)
            }
        };

        let body = Json(json!({
            "message": message
        }));

        let mut response = (status, body).into_response();
        if matches!(self, AppError::MethodNotAllowed) {
            response
                .headers_mut()
                .insert(header::ALLOW, HeaderValue::from_static("POST"));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::MethodNotAllowed.into_response().status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            AppError::ConfigMissing.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::MissingPhotos.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        let transmission = AppError::Telegram(TelegramError::Api {
            status: 400,
            description: "Bad Request: chat not found".to_string(),
        });
        assert_eq!(
            transmission.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_method_not_allowed_sets_allow_header() {
        let response = AppError::MethodNotAllowed.into_response();
        assert_eq!(response.headers()[header::ALLOW], "POST");
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );
    }
}
