use std::time::Duration;

use thiserror::Error;

/// Why a remote analysis could not be used. Every variant is recovered by the
/// analyzer: text failures fall back to keyword classification, image
/// failures drop the boost.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("remote analyzer unavailable: {0}")]
    Unavailable(String),

    #[error("malformed analyzer reply: {0}")]
    Malformed(String),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid priority value: {0}")]
    InvalidPriority(String),

    #[error("invalid bonus score: {0}")]
    InvalidBonusScore(String),

    #[error("remote analyzer timed out after {0:?}")]
    Timeout(Duration),

    #[error("no remote analyzer configured")]
    Offline,
}

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("duplicate objection id in batch: {0}")]
    DuplicateId(String),
}
