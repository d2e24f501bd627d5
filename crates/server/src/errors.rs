use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use service::errors::ServiceError;
use thiserror::Error;
use tracing::error;

/// JSON error body: `{"error": title, "message": detail, "missing": [...]}`.
#[derive(Debug, Serialize)]
pub struct JsonApiError {
    #[serde(skip)]
    pub status: StatusCode,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing: Option<Vec<String>>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, title: &str, message: Option<String>) -> Self {
        Self { status, error: title.to_string(), message, missing: None }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Bad Request", Some(message.into()))
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        let msg = Some(e.to_string());
        match e {
            ServiceError::NotFound(_) => Self::new(StatusCode::NOT_FOUND, "Not Found", msg),
            ServiceError::BadRequest(_) => Self::new(StatusCode::BAD_REQUEST, "Bad Request", msg),
            ServiceError::Validation { missing } => Self {
                missing: Some(missing),
                ..Self::new(StatusCode::BAD_REQUEST, "Validation Error", msg)
            },
            ServiceError::StorageUnavailable(_) | ServiceError::StorageWriteFailed(_) | ServiceError::Config(_) => {
                error!(error = msg.as_deref().unwrap_or_default(), "storage failure");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", msg)
            }
        }
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        let status = self.status;
        (status, Json(self)).into_response()
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("storage initialisation failed: {0}")]
    Storage(#[from] ServiceError),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_errors_map_to_statuses() {
        let cases = [
            (ServiceError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (ServiceError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
            (ServiceError::Validation { missing: vec!["name".into()] }, StatusCode::BAD_REQUEST),
            (ServiceError::StorageUnavailable("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (ServiceError::StorageWriteFailed("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(JsonApiError::from(err).status, status);
        }
    }

    #[test]
    fn validation_body_lists_missing_fields() {
        let err = JsonApiError::from(ServiceError::Validation { missing: vec!["name".into(), "email".into()] });
        let body = serde_json::to_value(&err).unwrap();
        assert_eq!(body["error"], "Validation Error");
        assert_eq!(body["missing"], serde_json::json!(["name", "email"]));
        assert!(body.get("status").is_none());
    }
}
