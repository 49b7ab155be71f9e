use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unable to write results: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unable to encode results: {0}")]
    Json(#[from] serde_json::Error),
}
