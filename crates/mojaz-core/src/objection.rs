//! Citizen objections and their review state machine.
//!
//! ```text
//! pending --(approve)--> resolved/approved   [terminal]
//! pending --(reject)---> resolved/rejected   [terminal]
//! ```
//!
//! Only `priority` and the review state ever change after submission.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::Priority;
use crate::error::ObjectionError;

/// The fixed set of traffic-violation categories an objection can target.
///
/// Serialized as the Arabic display label, which is also the text sent to the
/// remote analyzer. Parsing accepts the label or an ASCII slug.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ViolationType {
    Speeding,
    IgnoringSignals,
    IrregularParking,
    NoSeatBelt,
    DangerousOvertaking,
    UnsafeFollowingDistance,
    RecklessDriving,
    PhoneWhileDriving,
    IgnoringWarningSigns,
}

impl ViolationType {
    pub const ALL: [ViolationType; 9] = [
        Self::Speeding,
        Self::IgnoringSignals,
        Self::IrregularParking,
        Self::NoSeatBelt,
        Self::DangerousOvertaking,
        Self::UnsafeFollowingDistance,
        Self::RecklessDriving,
        Self::PhoneWhileDriving,
        Self::IgnoringWarningSigns,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Speeding => "تجاوز الحد الأقصى للسرعة",
            Self::IgnoringSignals => "عدم الالتزام بالإشارات",
            Self::IrregularParking => "وقوف غير منظم",
            Self::NoSeatBelt => "عدم ارتداء حزام الأمان",
            Self::DangerousOvertaking => "تجاوز خطير",
            Self::UnsafeFollowingDistance => "عدم الالتزام بالمسافات الآمنة",
            Self::RecklessDriving => "القيادة المتهورة",
            Self::PhoneWhileDriving => "استخدام الهاتف أثناء القيادة",
            Self::IgnoringWarningSigns => "تجاهل لافتات التحذير",
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            Self::Speeding => "speeding",
            Self::IgnoringSignals => "signals",
            Self::IrregularParking => "parking",
            Self::NoSeatBelt => "seat-belt",
            Self::DangerousOvertaking => "dangerous-overtaking",
            Self::UnsafeFollowingDistance => "following-distance",
            Self::RecklessDriving => "reckless-driving",
            Self::PhoneWhileDriving => "phone-use",
            Self::IgnoringWarningSigns => "warning-signs",
        }
    }
}

impl std::str::FromStr for ViolationType {
    type Err = ObjectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|v| v.label() == s || v.slug().eq_ignore_ascii_case(s))
            .ok_or_else(|| ObjectionError::UnknownViolationType(s.to_string()))
    }
}

impl TryFrom<String> for ViolationType {
    type Error = ObjectionError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ViolationType> for String {
    fn from(v: ViolationType) -> String {
        v.label().to_string()
    }
}

impl std::fmt::Display for ViolationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Final staff decision on an objection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    Approved,
    Rejected,
}

impl Resolution {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

/// Review state. A resolution exists only in the `Resolved` variant.
///
/// Flattened into [`Objection`] as `"status": "pending"` or
/// `"status": "resolved", "resolution": "..."`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ReviewState {
    Pending,
    Resolved { resolution: Resolution },
}

/// What a citizen submits; the store turns it into an [`Objection`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewObjection {
    pub violation_type: ViolationType,
    pub description: String,
    /// Evidence item names, e.g. attached file names.
    pub evidence: Vec<String>,
    pub plate_number: Option<String>,
    pub location: Option<String>,
}

impl NewObjection {
    pub fn new(violation_type: ViolationType, description: impl Into<String>) -> Self {
        Self {
            violation_type,
            description: description.into(),
            evidence: Vec::new(),
            plate_number: None,
            location: None,
        }
    }

    pub fn with_evidence(mut self, evidence: Vec<String>) -> Self {
        self.evidence = evidence;
        self
    }
}

/// A citizen-submitted dispute against a recorded traffic violation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Objection {
    id: String,
    case_number: String,
    violation_type: ViolationType,
    description: String,
    #[serde(default)]
    evidence: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    plate_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    location: Option<String>,
    priority: Priority,
    #[serde(flatten)]
    state: ReviewState,
    timestamp: DateTime<Utc>,
}

impl Objection {
    /// Build a pending objection. The case number is the last six digits of
    /// the identifier (or the whole identifier if it carries no digits).
    pub fn new(
        id: impl Into<String>,
        submission: NewObjection,
        priority: Priority,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let id = id.into();
        let case_number = case_number_for(&id);
        Self {
            id,
            case_number,
            violation_type: submission.violation_type,
            description: submission.description,
            evidence: submission.evidence,
            plate_number: submission.plate_number,
            location: submission.location,
            priority,
            state: ReviewState::Pending,
            timestamp,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn case_number(&self) -> &str {
        &self.case_number
    }

    pub fn violation_type(&self) -> ViolationType {
        self.violation_type
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn evidence(&self) -> &[String] {
        &self.evidence
    }

    pub fn plate_number(&self) -> Option<&str> {
        self.plate_number.as_deref()
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    /// Batch re-analysis is the only writer of priority after submission.
    pub fn set_priority(&mut self, priority: Priority) {
        self.priority = priority;
    }

    pub fn state(&self) -> ReviewState {
        self.state
    }

    pub fn is_pending(&self) -> bool {
        self.state == ReviewState::Pending
    }

    pub fn resolution(&self) -> Option<Resolution> {
        match self.state {
            ReviewState::Pending => None,
            ReviewState::Resolved { resolution } => Some(resolution),
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Move a pending objection to its terminal state.
    pub fn resolve(&mut self, resolution: Resolution) -> Result<(), ObjectionError> {
        match self.state {
            ReviewState::Resolved { .. } => Err(ObjectionError::AlreadyResolved {
                id: self.id.clone(),
            }),
            ReviewState::Pending => {
                self.state = ReviewState::Resolved { resolution };
                Ok(())
            }
        }
    }
}

fn case_number_for(id: &str) -> String {
    let digits: Vec<char> = id
        .chars()
        .rev()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if digits.is_empty() {
        return id.to_string();
    }
    digits.into_iter().take(6).rev().collect()
}
