use thiserror::Error;

#[derive(Debug, Error)]
pub enum ObjectionError {
    #[error("objection not found: {0}")]
    NotFound(String),

    #[error("objection {id} is already resolved")]
    AlreadyResolved { id: String },

    #[error("unknown violation type: {0}")]
    UnknownViolationType(String),

    #[error("bonus score {0} outside 0..=25")]
    InvalidBonusScore(i64),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
