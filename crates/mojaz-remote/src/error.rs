use mojaz_ai::AnalysisError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("completion contained no text")]
    EmptyCompletion,
}

impl From<RemoteError> for AnalysisError {
    fn from(e: RemoteError) -> Self {
        match e {
            RemoteError::Http(_) | RemoteError::Server { .. } => {
                AnalysisError::Unavailable(e.to_string())
            }
            RemoteError::Json(_) | RemoteError::EmptyCompletion => {
                AnalysisError::Malformed(e.to_string())
            }
        }
    }
}
