//! Analysis results produced per classification call.
//!
//! These are transient: the store only keeps the resulting [`Priority`] on
//! each objection. The serde shape matches the remote analyzer contract
//! (camelCase keys, lowercase tiers).

use serde::{Deserialize, Serialize};

use crate::error::ObjectionError;

/// Strength tier of an objection, driving review order.
///
/// The derived ordering is the review ordering: `High < Medium < Low`, so an
/// ascending sort puts the strongest objections first. Every call site that
/// orders objections goes through this one `Ord`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    /// Parse a wire value. Only the three lowercase tiers are accepted.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }

    /// One tier up; `High` saturates.
    pub fn promoted(self) -> Self {
        match self {
            Self::Low => Self::Medium,
            Self::Medium | Self::High => Self::High,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How well an evidence image matches the objection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchQuality {
    High,
    Medium,
    Low,
}

impl MatchQuality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

/// Image evidence score, guaranteed to lie in `0..=25`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct BonusScore(u8);

impl BonusScore {
    pub const MAX: u8 = 25;
    /// Scores at or above this promote the text priority by one tier.
    pub const BOOST_THRESHOLD: u8 = 20;

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn boosts(self) -> bool {
        self.0 >= Self::BOOST_THRESHOLD
    }
}

impl TryFrom<i64> for BonusScore {
    type Error = ObjectionError;

    fn try_from(v: i64) -> Result<Self, Self::Error> {
        if (0..=Self::MAX as i64).contains(&v) {
            Ok(Self(v as u8))
        } else {
            Err(ObjectionError::InvalidBonusScore(v))
        }
    }
}

impl From<BonusScore> for u8 {
    fn from(s: BonusScore) -> u8 {
        s.0
    }
}

/// Result of scoring one evidence image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageAnalysisResult {
    pub bonus_score: BonusScore,
    pub match_quality: MatchQuality,
    #[serde(default)]
    pub has_evidence: bool,
    #[serde(default)]
    pub reasoning: String,
    #[serde(default)]
    pub details: String,
}

/// Result of classifying one objection, remote or local.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub priority: Priority,
    pub has_evidence: bool,
    pub reasoning: String,
    /// 0.0–1.0.
    pub confidence: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_analysis: Option<ImageAnalysisResult>,
}

impl AnalysisResult {
    /// Attach an image score, promoting the priority one tier when the score
    /// reaches [`BonusScore::BOOST_THRESHOLD`].
    pub fn apply_image_boost(&mut self, image: ImageAnalysisResult) {
        if image.bonus_score.boosts() {
            self.priority = self.priority.promoted();
        }
        self.image_analysis = Some(image);
    }
}
