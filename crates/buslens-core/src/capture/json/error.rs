use thiserror::Error;

#[derive(Debug, Error)]
pub enum JsonSourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid capture ({context}): {message}")]
    Invalid { context: String, message: String },
}

impl From<JsonSourceError> for crate::capture::CaptureError {
    fn from(value: JsonSourceError) -> Self {
        match value {
            JsonSourceError::Io(err) => Self::Io(err),
            JsonSourceError::Json(err) => Self::Parse(err),
            JsonSourceError::Invalid { context, message } => Self::Invalid { context, message },
        }
    }
}
