//! Structured coaching feedback.

use serde::{Deserialize, Serialize};

/// Which rule produced a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    ElbowTooBent,
    ElbowTooStraight,
    LowContactPoint,
    IncompleteExtension,
    /// Emitted alone when no corrective rule fired.
    GeneralPositive,
}

impl RecommendationKind {
    pub fn is_corrective(self) -> bool {
        !matches!(self, RecommendationKind::GeneralPositive)
    }
}

/// One coaching recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub title: String,
    pub advice: String,
}

/// Final, read-only output of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackReport {
    pub title: String,

    /// Detected defining events, in serve order (e.g. "Trophy pose (frame 15)").
    pub phases_detected: Vec<String>,

    /// Positive notes for measurements inside their ideal range.
    #[serde(default)]
    pub strengths: Vec<String>,

    /// Never empty: at least one entry is always present.
    pub recommendations: Vec<Recommendation>,
}

impl FeedbackReport {
    /// Whether any corrective recommendation was produced.
    pub fn has_corrections(&self) -> bool {
        self.recommendations.iter().any(|r| r.kind.is_corrective())
    }

    pub fn contains(&self, kind: RecommendationKind) -> bool {
        self.recommendations.iter().any(|r| r.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(kind: RecommendationKind) -> Recommendation {
        Recommendation {
            kind,
            title: String::new(),
            advice: String::new(),
        }
    }

    #[test]
    fn test_has_corrections() {
        let mut report = FeedbackReport {
            title: "Serve Analysis".to_string(),
            phases_detected: vec![],
            strengths: vec![],
            recommendations: vec![rec(RecommendationKind::GeneralPositive)],
        };
        assert!(!report.has_corrections());

        report
            .recommendations
            .push(rec(RecommendationKind::LowContactPoint));
        assert!(report.has_corrections());
        assert!(report.contains(RecommendationKind::LowContactPoint));
        assert!(!report.contains(RecommendationKind::ElbowTooBent));
    }

    #[test]
    fn test_strengths_default_when_absent() {
        let raw = r#"{"title":"Serve Analysis","phases_detected":[],"recommendations":[]}"#;
        let report: FeedbackReport = serde_json::from_str(raw).unwrap();
        assert!(report.strengths.is_empty());
    }
}
