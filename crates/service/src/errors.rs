use models::errors::ModelError;
use thiserror::Error;

/// Failure kinds of the record store.
///
/// A `StorageWriteFailed` leaves the in-memory collection already mutated;
/// it matches the file again after the next successful reload.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
    #[error("storage write failed: {0}")]
    StorageWriteFailed(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("validation error: missing required fields: {}", missing.join(", "))]
    Validation { missing: Vec<String> },
    #[error("configuration error: {0}")]
    Config(String),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(entity.to_string()) }
}

impl From<ModelError> for ServiceError {
    fn from(e: ModelError) -> Self {
        Self::BadRequest(e.to_string())
    }
}
