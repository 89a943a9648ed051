//! Per-frame arm metrics and the serve phase enumeration.

use serde::{Deserialize, Serialize};

use crate::landmark::Side;

/// Arm kinematics derived from one landmark frame.
///
/// Created once per successfully processed frame and never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameMetrics {
    /// 1-based source frame index.
    #[serde(rename = "frame")]
    pub frame_index: u64,

    /// Which arm the metrics were measured on.
    pub arm: Side,

    /// Angle at the elbow between upper arm and forearm, degrees [0, 180].
    pub elbow_angle: f64,

    /// Upper-arm angle from vertical, degrees [0, 180].
    pub shoulder_abduction: f64,

    /// Normalized wrist `y` [0, 1]. Smaller is higher.
    pub wrist_height: f64,

    /// Absolute vertical wrist speed in normalized units per second.
    pub wrist_velocity: f64,
}

/// Biomechanical phases of an overhead serve, in the only order they occur.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum ServePhase {
    #[default]
    Stance,
    ArmCocking,
    Acceleration,
    BallContact,
    FollowThrough,
}

impl ServePhase {
    pub const ALL: [ServePhase; 5] = [
        ServePhase::Stance,
        ServePhase::ArmCocking,
        ServePhase::Acceleration,
        ServePhase::BallContact,
        ServePhase::FollowThrough,
    ];

    /// The phase that follows this one, if any.
    pub fn next(self) -> Option<ServePhase> {
        match self {
            ServePhase::Stance => Some(ServePhase::ArmCocking),
            ServePhase::ArmCocking => Some(ServePhase::Acceleration),
            ServePhase::Acceleration => Some(ServePhase::BallContact),
            ServePhase::BallContact => Some(ServePhase::FollowThrough),
            ServePhase::FollowThrough => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self.next().is_none()
    }

    /// Human-readable phase name.
    pub fn label(self) -> &'static str {
        match self {
            ServePhase::Stance => "Stance",
            ServePhase::ArmCocking => "Arm cocking",
            ServePhase::Acceleration => "Acceleration",
            ServePhase::BallContact => "Ball contact",
            ServePhase::FollowThrough => "Follow-through",
        }
    }
}

impl std::fmt::Display for ServePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A phase change observed by the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseTransition {
    pub from: ServePhase,
    pub to: ServePhase,
    /// Frame on which the entry condition of `to` fired.
    pub frame: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_order_is_total() {
        for pair in ServePhase::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
            assert_eq!(pair[0].next(), Some(pair[1]));
        }
        assert!(ServePhase::FollowThrough.is_terminal());
        assert!(!ServePhase::Stance.is_terminal());
    }

    #[test]
    fn test_phase_serializes_snake_case() {
        let json = serde_json::to_string(&ServePhase::ArmCocking).unwrap();
        assert_eq!(json, "\"arm_cocking\"");
    }

    #[test]
    fn test_frame_metrics_json_shape() {
        let metrics = FrameMetrics {
            frame_index: 7,
            arm: Side::Right,
            elbow_angle: 95.0,
            shoulder_abduction: 70.0,
            wrist_height: 0.4,
            wrist_velocity: 3.0,
        };
        let value = serde_json::to_value(metrics).unwrap();
        assert_eq!(value["frame"], 7);
        assert_eq!(value["arm"], "right");
        assert_eq!(value["wrist_velocity"], 3.0);
    }
}
