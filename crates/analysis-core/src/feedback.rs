//! Rule-based coaching feedback.
//!
//! Runs once at the end of a session over the recorded trophy pose and
//! contact point. Either may be missing; a missing record simply produces no
//! feedback for its phase.

use servecoach_pose_model::report::{FeedbackReport, Recommendation, RecommendationKind};
use servecoach_pose_model::summary::{ContactPoint, PhaseSummary, TrophyPose};

pub const REPORT_TITLE: &str = "Serve Analysis";

/// Thresholds for the feedback rule table, in degrees.
#[derive(Debug, Clone)]
pub struct FeedbackRules {
    /// Trophy-pose elbow flexion below this is "too bent".
    pub min_trophy_elbow: f64,
    /// Trophy-pose elbow flexion above this is "too straight".
    pub max_trophy_elbow: f64,
    /// Shoulder abduction at contact below this is a low contact point.
    pub min_contact_abduction: f64,
    /// Elbow angle at contact below this is incomplete extension.
    pub min_contact_extension: f64,
}

impl Default for FeedbackRules {
    fn default() -> Self {
        Self {
            min_trophy_elbow: 80.0,
            max_trophy_elbow: 130.0,
            min_contact_abduction: 100.0,
            min_contact_extension: 160.0,
        }
    }
}

/// Evaluates the rule table against a phase summary.
#[derive(Debug, Clone, Default)]
pub struct FeedbackEngine {
    rules: FeedbackRules,
}

impl FeedbackEngine {
    pub fn new(rules: FeedbackRules) -> Self {
        Self { rules }
    }

    pub fn with_defaults() -> Self {
        Self::default()
    }

    /// Build the report. Always returns at least one recommendation.
    pub fn evaluate(&self, summary: &PhaseSummary) -> FeedbackReport {
        let mut phases_detected = Vec::new();
        let mut strengths = Vec::new();
        let mut recommendations = Vec::new();

        if let Some(trophy) = summary.trophy_pose() {
            phases_detected.push(format!("Trophy pose (frame {})", trophy.frame));
            self.check_trophy_pose(trophy, &mut strengths, &mut recommendations);
        }

        if let Some(contact) = summary.contact() {
            phases_detected.push(format!("Ball contact (frame {})", contact.frame));
            self.check_contact(contact, &mut strengths, &mut recommendations);
        }

        if recommendations.is_empty() {
            recommendations.push(Recommendation {
                kind: RecommendationKind::GeneralPositive,
                title: "Solid Serve Mechanics".to_string(),
                advice: "No major technical faults detected. Keep reinforcing this motion \
                         with consistent repetitions."
                    .to_string(),
            });
        }

        FeedbackReport {
            title: REPORT_TITLE.to_string(),
            phases_detected,
            strengths,
            recommendations,
        }
    }

    fn check_trophy_pose(
        &self,
        trophy: &TrophyPose,
        strengths: &mut Vec<String>,
        recommendations: &mut Vec<Recommendation>,
    ) {
        let r = &self.rules;
        let elbow = trophy.elbow_flexion;

        if elbow < r.min_trophy_elbow {
            recommendations.push(Recommendation {
                kind: RecommendationKind::ElbowTooBent,
                title: "Elbow Too Bent in Cocking Phase".to_string(),
                advice: format!(
                    "Your elbow closed to {elbow:.0}° at the trophy pose (frame {}). Open it to \
                     around 90-110° so the arm stays loaded without collapsing behind your head.",
                    trophy.frame
                ),
            });
        } else if elbow > r.max_trophy_elbow {
            recommendations.push(Recommendation {
                kind: RecommendationKind::ElbowTooStraight,
                title: "Elbow Too Straight in Cocking Phase".to_string(),
                advice: format!(
                    "Your elbow only bent to {elbow:.0}° at the trophy pose (frame {}). Draw the \
                     elbow back and up, aiming for 90-110°, to load the arm before you swing.",
                    trophy.frame
                ),
            });
        } else {
            strengths.push(format!(
                "Good trophy pose: elbow at {elbow:.0}° is within the {:.0}-{:.0}° range.",
                r.min_trophy_elbow, r.max_trophy_elbow
            ));
        }
    }

    fn check_contact(
        &self,
        contact: &ContactPoint,
        strengths: &mut Vec<String>,
        recommendations: &mut Vec<Recommendation>,
    ) {
        let r = &self.rules;

        if contact.shoulder_abduction < r.min_contact_abduction {
            recommendations.push(Recommendation {
                kind: RecommendationKind::LowContactPoint,
                title: "Low Contact Point".to_string(),
                advice: format!(
                    "Your upper arm was {:.0}° from vertical at contact. Reach higher and meet \
                     the ball above your hitting shoulder; 120-150° is ideal.",
                    contact.shoulder_abduction
                ),
            });
        } else {
            strengths.push(format!(
                "High contact point: shoulder at {:.0}°.",
                contact.shoulder_abduction
            ));
        }

        if contact.elbow_extension < r.min_contact_extension {
            recommendations.push(Recommendation {
                kind: RecommendationKind::IncompleteExtension,
                title: "Incomplete Arm Extension".to_string(),
                advice: format!(
                    "Your elbow was at {:.0}° at contact. Extend fully through the ball \
                     (170-180°) to add power and control.",
                    contact.elbow_extension
                ),
            });
        } else {
            strengths.push(format!(
                "Full arm extension at contact: elbow at {:.0}°.",
                contact.elbow_extension
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary_with_trophy(elbow_flexion: f64) -> PhaseSummary {
        let mut summary = PhaseSummary::new();
        summary.record_trophy_pose(TrophyPose {
            frame: 15,
            elbow_flexion,
            wrist_height: 0.3,
        });
        summary
    }

    fn contact(shoulder_abduction: f64, elbow_extension: f64) -> ContactPoint {
        ContactPoint {
            frame: 22,
            shoulder_abduction,
            elbow_extension,
            max_velocity: 0.5,
        }
    }

    fn kinds(report: &FeedbackReport) -> Vec<RecommendationKind> {
        report.recommendations.iter().map(|r| r.kind).collect()
    }

    #[test]
    fn test_elbow_too_bent() {
        let report = FeedbackEngine::with_defaults().evaluate(&summary_with_trophy(70.0));
        assert_eq!(kinds(&report), vec![RecommendationKind::ElbowTooBent]);
        assert!(report.recommendations[0].title.contains("Too Bent"));
    }

    #[test]
    fn test_elbow_too_straight() {
        let report = FeedbackEngine::with_defaults().evaluate(&summary_with_trophy(150.0));
        assert_eq!(kinds(&report), vec![RecommendationKind::ElbowTooStraight]);
        assert!(report.recommendations[0].title.contains("Too Straight"));
    }

    #[test]
    fn test_good_elbow_gives_strength_not_recommendation() {
        let report = FeedbackEngine::with_defaults().evaluate(&summary_with_trophy(100.0));
        assert!(!report.contains(RecommendationKind::ElbowTooBent));
        assert!(!report.contains(RecommendationKind::ElbowTooStraight));
        assert_eq!(kinds(&report), vec![RecommendationKind::GeneralPositive]);
        assert_eq!(report.strengths.len(), 1);
    }

    #[test]
    fn test_range_bounds_are_inclusive() {
        let engine = FeedbackEngine::with_defaults();
        assert!(!engine.evaluate(&summary_with_trophy(80.0)).has_corrections());
        assert!(!engine.evaluate(&summary_with_trophy(130.0)).has_corrections());
    }

    #[test]
    fn test_contact_rules_fire_independently() {
        let mut summary = PhaseSummary::new();
        summary.record_contact(contact(90.0, 150.0));
        let report = FeedbackEngine::with_defaults().evaluate(&summary);
        assert_eq!(
            kinds(&report),
            vec![
                RecommendationKind::LowContactPoint,
                RecommendationKind::IncompleteExtension
            ]
        );
        assert_eq!(report.phases_detected, vec!["Ball contact (frame 22)"]);
    }

    #[test]
    fn test_clean_serve_lists_both_phases() {
        let mut summary = summary_with_trophy(100.0);
        summary.record_contact(contact(140.0, 172.0));
        let report = FeedbackEngine::with_defaults().evaluate(&summary);

        assert_eq!(
            report.phases_detected,
            vec!["Trophy pose (frame 15)", "Ball contact (frame 22)"]
        );
        assert_eq!(kinds(&report), vec![RecommendationKind::GeneralPositive]);
        assert_eq!(report.strengths.len(), 3);
    }

    #[test]
    fn test_empty_summary_yields_single_generic_entry() {
        let report = FeedbackEngine::with_defaults().evaluate(&PhaseSummary::new());
        assert_eq!(report.title, REPORT_TITLE);
        assert!(report.phases_detected.is_empty());
        assert_eq!(kinds(&report), vec![RecommendationKind::GeneralPositive]);
    }
}
