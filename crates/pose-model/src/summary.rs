//! Write-once records of each serve phase.
//!
//! Every field is written at most once, on the frame where the following
//! phase's entry condition fires. The record describes the phase's defining
//! event (trophy pose, contact point), which happened one or more frames
//! before that transition frame.

use serde::{Deserialize, Serialize};

use crate::metrics::ServePhase;

/// The trophy pose: deepest elbow flexion while cocking the arm.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrophyPose {
    /// Frame of the minimum elbow angle.
    pub frame: u64,
    /// Minimum elbow angle in degrees.
    pub elbow_flexion: f64,
    /// Highest wrist position reached while cocking (smallest `y`).
    pub wrist_height: f64,
}

/// The contact point: peak wrist speed during acceleration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContactPoint {
    /// Frame of the peak wrist velocity.
    pub frame: u64,
    /// Shoulder abduction on the detection frame, degrees.
    pub shoulder_abduction: f64,
    /// Elbow angle on the detection frame, degrees.
    pub elbow_extension: f64,
    /// Peak wrist velocity.
    pub max_velocity: f64,
}

/// Extent of a phase that has no single defining event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseWindow {
    /// First processed frame spent in the phase.
    pub entered_frame: u64,
    /// Number of processed frames spent in the phase. Zero when the phase was
    /// left on the same frame it was entered.
    pub frame_count: u64,
}

/// Fixed five-slot summary, one optional record per phase.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhaseSummary {
    stance: Option<PhaseWindow>,
    arm_cocking: Option<TrophyPose>,
    acceleration: Option<PhaseWindow>,
    ball_contact: Option<ContactPoint>,
    follow_through: Option<PhaseWindow>,
}

/// Store `value` into an empty slot. Returns false if the slot was taken.
fn write_once<T>(slot: &mut Option<T>, value: T) -> bool {
    if slot.is_some() {
        return false;
    }
    *slot = Some(value);
    true
}

impl PhaseSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_stance(&mut self, window: PhaseWindow) -> bool {
        write_once(&mut self.stance, window)
    }

    pub fn record_trophy_pose(&mut self, pose: TrophyPose) -> bool {
        write_once(&mut self.arm_cocking, pose)
    }

    pub fn record_acceleration(&mut self, window: PhaseWindow) -> bool {
        write_once(&mut self.acceleration, window)
    }

    pub fn record_contact(&mut self, contact: ContactPoint) -> bool {
        write_once(&mut self.ball_contact, contact)
    }

    pub fn record_follow_through(&mut self, window: PhaseWindow) -> bool {
        write_once(&mut self.follow_through, window)
    }

    pub fn stance(&self) -> Option<&PhaseWindow> {
        self.stance.as_ref()
    }

    /// Summary keyed by [`ServePhase::ArmCocking`].
    pub fn trophy_pose(&self) -> Option<&TrophyPose> {
        self.arm_cocking.as_ref()
    }

    pub fn acceleration(&self) -> Option<&PhaseWindow> {
        self.acceleration.as_ref()
    }

    /// Summary keyed by [`ServePhase::BallContact`].
    pub fn contact(&self) -> Option<&ContactPoint> {
        self.ball_contact.as_ref()
    }

    pub fn follow_through(&self) -> Option<&PhaseWindow> {
        self.follow_through.as_ref()
    }

    /// Whether the slot for `phase` has been written.
    pub fn is_recorded(&self, phase: ServePhase) -> bool {
        match phase {
            ServePhase::Stance => self.stance.is_some(),
            ServePhase::ArmCocking => self.arm_cocking.is_some(),
            ServePhase::Acceleration => self.acceleration.is_some(),
            ServePhase::BallContact => self.ball_contact.is_some(),
            ServePhase::FollowThrough => self.follow_through.is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_summary_is_empty() {
        let summary = PhaseSummary::new();
        assert!(ServePhase::ALL.iter().all(|p| !summary.is_recorded(*p)));
    }

    #[test]
    fn test_slots_are_write_once() {
        let mut summary = PhaseSummary::new();
        let first = TrophyPose {
            frame: 15,
            elbow_flexion: 95.0,
            wrist_height: 0.35,
        };
        assert!(summary.record_trophy_pose(first));
        assert!(!summary.record_trophy_pose(TrophyPose {
            frame: 20,
            elbow_flexion: 60.0,
            wrist_height: 0.2,
        }));
        assert_eq!(summary.trophy_pose(), Some(&first));
        assert!(summary.is_recorded(ServePhase::ArmCocking));
        assert!(!summary.is_recorded(ServePhase::BallContact));
    }

    #[test]
    fn test_serialized_keys_follow_phase_names() {
        let mut summary = PhaseSummary::new();
        summary.record_contact(ContactPoint {
            frame: 22,
            shoulder_abduction: 140.0,
            elbow_extension: 170.0,
            max_velocity: 0.5,
        });
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["ball_contact"]["frame"], 22);
        assert!(value["arm_cocking"].is_null());
    }
}
