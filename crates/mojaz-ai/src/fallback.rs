//! Deterministic keyword classifier used whenever the remote analyzer fails.
//!
//! | evidence | strong argument | priority | confidence |
//! |----------|-----------------|----------|------------|
//! | yes      | yes             | high     | 0.85       |
//! | yes      | no              | medium   | 0.70       |
//! | no       | yes             | medium   | 0.70       |
//! | no       | no              | low      | 0.60       |
//!
//! Evidence means an evidence keyword in the text or at least one attachment.
//! Weak phrases are detected but deliberately play no part in the decision.

use mojaz_core::{AnalysisResult, Priority};
use tracing::debug;

use crate::keywords::{EVIDENCE_KEYWORDS, STRONG_ARGUMENT_KEYWORDS, WEAK_PHRASES, contains_any};

pub const HIGH_CONFIDENCE: f32 = 0.85;
pub const MEDIUM_CONFIDENCE: f32 = 0.70;
pub const LOW_CONFIDENCE: f32 = 0.60;

const HIGH_REASONING: &str = "اعتراض قوي: يحتوي على أدلة وحجج منطقية";
const MEDIUM_REASONING: &str = "اعتراض متوسط: يحتوي على بعض الحجج أو الأدلة";
const LOW_REASONING: &str = "اعتراض ضعيف: اعتذار بدون أدلة قوية";

/// Keyword signals found in one objection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeywordSignals {
    pub evidence_keyword: bool,
    pub has_attachments: bool,
    pub strong_argument: bool,
    /// Not consulted by [`classify`].
    pub weak_phrase: bool,
}

impl KeywordSignals {
    pub fn detect(text: &str, attachments_count: u32) -> Self {
        let text = text.to_lowercase();
        Self {
            evidence_keyword: contains_any(&text, EVIDENCE_KEYWORDS),
            has_attachments: attachments_count > 0,
            strong_argument: contains_any(&text, STRONG_ARGUMENT_KEYWORDS),
            weak_phrase: contains_any(&text, WEAK_PHRASES),
        }
    }

    pub fn has_evidence(&self) -> bool {
        self.evidence_keyword || self.has_attachments
    }
}

/// Classify an objection from its text and attachment count. Pure and total.
pub fn classify(text: &str, attachments_count: u32) -> AnalysisResult {
    let signals = KeywordSignals::detect(text, attachments_count);
    let has_evidence = signals.has_evidence();

    let (priority, confidence, reasoning) = match (has_evidence, signals.strong_argument) {
        (true, true) => (Priority::High, HIGH_CONFIDENCE, HIGH_REASONING),
        (true, false) | (false, true) => (Priority::Medium, MEDIUM_CONFIDENCE, MEDIUM_REASONING),
        (false, false) => (Priority::Low, LOW_CONFIDENCE, LOW_REASONING),
    };

    debug!(?signals, %priority, "keyword fallback classification");

    AnalysisResult {
        priority,
        has_evidence,
        reasoning: reasoning.to_string(),
        confidence,
        image_analysis: None,
    }
}
