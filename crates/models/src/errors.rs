use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid date `{0}`")]
    InvalidDate(String),
    #[error("record payload must be a JSON object")]
    NotAnObject,
}
