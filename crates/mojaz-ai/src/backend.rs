//! The seam between the analyzer and whatever answers its requests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// Wire request for text analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextAnalysisRequest {
    pub text: String,
    /// Display label of the violation type.
    pub violation_type: String,
    pub attachments_count: u32,
}

/// Wire request for image evidence scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageAnalysisRequest {
    /// Base64-encoded image bytes.
    pub image: String,
    pub violation_type: String,
    pub objection_text: String,
}

/// A remote analyzer. Implementations return the raw reply text; parsing and
/// validation happen in the analyzer so every backend is held to the same
/// contract.
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    async fn analyze_text(&self, request: &TextAnalysisRequest) -> Result<String, AnalysisError>;

    async fn analyze_image(&self, request: &ImageAnalysisRequest)
    -> Result<String, AnalysisError>;
}
