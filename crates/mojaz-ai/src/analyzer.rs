//! Remote objection analysis with local fallback and image evidence boost.
//!
//! [`ObjectionAnalyzer::analyze`] is total: any remote failure (transport,
//! timeout, malformed or invalid reply) is replaced wholesale by the keyword
//! classifier's result. Image scoring only runs on a valid remote result and
//! its failure simply means no boost.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use mojaz_core::{AnalysisResult, ImageAnalysisResult, ViolationType};
use tracing::{debug, info, warn};

use crate::backend::{AnalysisBackend, ImageAnalysisRequest, TextAnalysisRequest};
use crate::error::AnalysisError;
use crate::{fallback, reply};

/// Citizens may attach up to this many images; only the first is scored.
pub const MAX_EVIDENCE_IMAGES: usize = 3;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Upper bound on each remote call. Expiry falls back like any failure.
    pub timeout: Duration,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Scores objections through a remote backend, falling back to keywords.
#[derive(Clone)]
pub struct ObjectionAnalyzer {
    backend: Option<Arc<dyn AnalysisBackend>>,
    config: AnalyzerConfig,
}

impl ObjectionAnalyzer {
    pub fn new(backend: Arc<dyn AnalysisBackend>, config: AnalyzerConfig) -> Self {
        Self {
            backend: Some(backend),
            config,
        }
    }

    /// An analyzer with no remote backend: every call uses the keyword classifier.
    pub fn offline() -> Self {
        Self {
            backend: None,
            config: AnalyzerConfig::default(),
        }
    }

    pub fn is_offline(&self) -> bool {
        self.backend.is_none()
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Classify one objection. Never fails.
    ///
    /// When `images` is non-empty and the remote text analysis succeeded,
    /// the first image (and only the first) is scored and may promote the
    /// priority by one tier.
    pub async fn analyze(
        &self,
        text: &str,
        violation_type: ViolationType,
        attachments_count: u32,
        images: &[Vec<u8>],
    ) -> AnalysisResult {
        let mut result = match self
            .analyze_remote(text, violation_type, attachments_count)
            .await
        {
            Ok(result) => result,
            Err(AnalysisError::Offline) => return fallback::classify(text, attachments_count),
            Err(e) => {
                warn!(error = %e, "remote analysis failed, using keyword fallback");
                return fallback::classify(text, attachments_count);
            }
        };

        if let Some(first) = images.first() {
            match self.analyze_image(first, violation_type, text).await {
                Ok(image) => {
                    let before = result.priority;
                    result.apply_image_boost(image);
                    if result.priority != before {
                        info!(from = %before, to = %result.priority, "priority promoted by image evidence");
                    }
                }
                Err(e) => warn!(error = %e, "image analysis failed, keeping text result"),
            }
        }

        result
    }

    /// Score one evidence image. Any failure fails the whole call; callers
    /// treat that as "no boost".
    pub async fn analyze_image(
        &self,
        image: &[u8],
        violation_type: ViolationType,
        objection_text: &str,
    ) -> Result<ImageAnalysisResult, AnalysisError> {
        let backend = self.backend.as_ref().ok_or(AnalysisError::Offline)?;
        let request = ImageAnalysisRequest {
            image: BASE64.encode(image),
            violation_type: violation_type.label().to_string(),
            objection_text: objection_text.to_string(),
        };
        debug!(backend = backend.name(), bytes = image.len(), "requesting image analysis");
        let raw = self.bounded(backend.analyze_image(&request)).await?;
        let result = reply::parse_image_reply(&raw)?;
        debug!(bonus = result.bonus_score.value(), quality = result.match_quality.as_str(), "image analysed");
        Ok(result)
    }

    async fn analyze_remote(
        &self,
        text: &str,
        violation_type: ViolationType,
        attachments_count: u32,
    ) -> Result<AnalysisResult, AnalysisError> {
        let backend = self.backend.as_ref().ok_or(AnalysisError::Offline)?;
        let request = TextAnalysisRequest {
            text: text.to_string(),
            violation_type: violation_type.label().to_string(),
            attachments_count,
        };
        debug!(backend = backend.name(), "requesting text analysis");
        let raw = self.bounded(backend.analyze_text(&request)).await?;
        reply::parse_text_reply(&raw)
    }

    async fn bounded<F>(&self, call: F) -> Result<String, AnalysisError>
    where
        F: Future<Output = Result<String, AnalysisError>>,
    {
        tokio::time::timeout(self.config.timeout, call)
            .await
            .map_err(|_| AnalysisError::Timeout(self.config.timeout))?
    }
}
