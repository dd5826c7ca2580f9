//! Parsing and validation of analyzer replies.
//!
//! LLM replies often arrive wrapped in Markdown code fences; those are
//! stripped before JSON parsing. Text replies must carry one of the three
//! priority tiers; image replies must carry an integral bonus score in 0..=25.

use mojaz_core::{AnalysisResult, BonusScore, ImageAnalysisResult, MatchQuality, Priority};
use serde::Deserialize;

use crate::error::AnalysisError;

/// Only `priority` is checked; the other fields fall back to
/// false / empty / 0 when missing or of the wrong JSON type.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TextReply {
    priority: Option<String>,
    #[serde(default)]
    has_evidence: serde_json::Value,
    #[serde(default)]
    reasoning: serde_json::Value,
    #[serde(default)]
    confidence: serde_json::Value,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageReply {
    bonus_score: serde_json::Value,
    match_quality: MatchQuality,
    #[serde(default)]
    has_evidence: bool,
    #[serde(default)]
    reasoning: String,
    #[serde(default)]
    details: String,
}

/// Remove ```` ```json ```` and ```` ``` ```` markers and surrounding whitespace.
pub fn strip_code_fences(raw: &str) -> String {
    raw.trim()
        .replace("```json", "")
        .replace("```", "")
        .trim()
        .to_string()
}

/// Parse a text-analysis reply. Anything but a known priority is rejected.
pub fn parse_text_reply(raw: &str) -> Result<AnalysisResult, AnalysisError> {
    let reply: TextReply = serde_json::from_str(&strip_code_fences(raw))?;

    let priority = match reply.priority {
        None => return Err(AnalysisError::InvalidPriority("<missing>".into())),
        Some(p) => Priority::parse(&p).ok_or(AnalysisError::InvalidPriority(p))?,
    };

    Ok(AnalysisResult {
        priority,
        has_evidence: reply.has_evidence.as_bool().unwrap_or(false),
        reasoning: reply.reasoning.as_str().unwrap_or_default().to_string(),
        confidence: reply.confidence.as_f64().unwrap_or(0.0).clamp(0.0, 1.0) as f32,
        image_analysis: None,
    })
}

/// Parse an image-analysis reply. The bonus score must be integral and in range.
pub fn parse_image_reply(raw: &str) -> Result<ImageAnalysisResult, AnalysisError> {
    let reply: ImageReply = serde_json::from_str(&strip_code_fences(raw))?;

    let score = &reply.bonus_score;
    let integral = score
        .as_i64()
        .or_else(|| score.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
        .ok_or_else(|| AnalysisError::InvalidBonusScore(score.to_string()))?;
    let bonus_score = BonusScore::try_from(integral)
        .map_err(|_| AnalysisError::InvalidBonusScore(integral.to_string()))?;

    Ok(ImageAnalysisResult {
        bonus_score,
        match_quality: reply.match_quality,
        has_evidence: reply.has_evidence,
        reasoning: reply.reasoning,
        details: reply.details,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fences_are_stripped() {
        let raw = "```json\n{\"priority\": \"high\"}\n```\n";
        assert_eq!(strip_code_fences(raw), "{\"priority\": \"high\"}");
        assert_eq!(strip_code_fences("  {}  "), "{}");
    }

    #[test]
    fn text_reply_full() {
        let r = parse_text_reply(
            r#"{"priority":"medium","hasEvidence":true,"reasoning":"ظروف مخففة","confidence":0.8}"#,
        )
        .unwrap();
        assert_eq!(r.priority, Priority::Medium);
        assert!(r.has_evidence);
        assert_eq!(r.reasoning, "ظروف مخففة");
        assert!((r.confidence - 0.8).abs() < 1e-6);
    }

    #[test]
    fn text_reply_in_fences() {
        let r = parse_text_reply("```json\n{\"priority\":\"low\",\"confidence\":0}\n```").unwrap();
        assert_eq!(r.priority, Priority::Low);
        assert_eq!(r.confidence, 0.0);
    }

    #[test]
    fn text_reply_rejects_unknown_priority() {
        let err = parse_text_reply(r#"{"priority":"urgent","hasEvidence":true}"#).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidPriority(p) if p == "urgent"));
    }

    #[test]
    fn text_reply_rejects_missing_priority() {
        let err = parse_text_reply(r#"{"hasEvidence":true}"#).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidPriority(_)));
    }

    #[test]
    fn text_reply_rejects_prose() {
        let err = parse_text_reply("The objection looks strong.").unwrap_err();
        assert!(matches!(err, AnalysisError::Json(_)));
    }

    #[test]
    fn text_reply_tolerates_mistyped_optional_fields() {
        let r = parse_text_reply(
            r#"{"priority":"high","hasEvidence":"yes","reasoning":null,"confidence":"0.9"}"#,
        )
        .unwrap();
        assert_eq!(r.priority, Priority::High);
        assert!(!r.has_evidence);
        assert_eq!(r.reasoning, "");
        assert_eq!(r.confidence, 0.0);

        let r = parse_text_reply(r#"{"priority":"medium","confidence":null}"#).unwrap();
        assert_eq!(r.priority, Priority::Medium);
        assert_eq!(r.confidence, 0.0);
    }

    #[test]
    fn confidence_is_clamped() {
        let r = parse_text_reply(r#"{"priority":"high","confidence":7}"#).unwrap();
        assert_eq!(r.confidence, 1.0);
    }

    #[test]
    fn image_reply_valid() {
        let r = parse_image_reply(
            r#"{"bonusScore":25,"matchQuality":"high","hasEvidence":true,"reasoning":"واضحة","details":"ختم رسمي"}"#,
        )
        .unwrap();
        assert_eq!(r.bonus_score.value(), 25);
        assert_eq!(r.match_quality, MatchQuality::High);
        assert_eq!(r.details, "ختم رسمي");
    }

    #[test]
    fn image_reply_accepts_integral_float() {
        let r = parse_image_reply(r#"{"bonusScore":10.0,"matchQuality":"medium"}"#).unwrap();
        assert_eq!(r.bonus_score.value(), 10);
    }

    #[test]
    fn image_reply_rejects_out_of_range_and_fractional() {
        for raw in [
            r#"{"bonusScore":30,"matchQuality":"high"}"#,
            r#"{"bonusScore":-5,"matchQuality":"low"}"#,
            r#"{"bonusScore":12.5,"matchQuality":"medium"}"#,
            r#"{"bonusScore":"25","matchQuality":"high"}"#,
        ] {
            assert!(
                matches!(parse_image_reply(raw), Err(AnalysisError::InvalidBonusScore(_))),
                "expected rejection for {raw}"
            );
        }
    }

    #[test]
    fn image_reply_rejects_unknown_match_quality() {
        let err = parse_image_reply(r#"{"bonusScore":5,"matchQuality":"perfect"}"#).unwrap_err();
        assert!(matches!(err, AnalysisError::Json(_)));
    }
}
