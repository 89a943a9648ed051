//! Diagnostic session export.
//!
//! A full snapshot of one analysis session, used for debugging and as the
//! input to the enrichment step. Exporting never mutates the session.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::landmark::{ModelError, Side};
use crate::metrics::{FrameMetrics, PhaseTransition, ServePhase};
use crate::summary::{ContactPoint, TrophyPose};

/// Snapshot of a session's buffered frames and phase records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionExport {
    /// Wall-clock time the session started (RFC 3339).
    pub started_at: String,

    /// Frame rate used to scale wrist velocity.
    pub frame_rate: u32,

    /// Configured serving arm.
    pub serving_arm: Side,

    /// Number of frames that produced metrics.
    pub total_frames: u64,

    /// Number of frames dropped as unusable observations.
    #[serde(default)]
    pub skipped_frames: u64,

    /// Phase after the last processed frame.
    pub final_phase: ServePhase,

    /// Every phase change, in order.
    #[serde(default)]
    pub transitions: Vec<PhaseTransition>,

    /// Defining events of the cocking and contact phases.
    pub phases: PhaseSnapshots,

    /// Every buffered frame, in frame order.
    pub all_frames: Vec<FrameMetrics>,

    /// Running extrema tracked by the state machine.
    pub summary_stats: SummaryStats,
}

/// Defining events, keyed the way coaches refer to them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhaseSnapshots {
    /// Arm-cocking summary.
    pub trophy_pose: Option<TrophyPose>,
    /// Ball-contact summary.
    pub ball_contact: Option<ContactPoint>,
}

/// Running extrema. `None` until the owning phase has seen a frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub min_elbow_angle: Option<f64>,
    pub min_elbow_frame: Option<u64>,
    pub max_wrist_velocity: Option<f64>,
    pub contact_frame: Option<u64>,
    /// Highest wrist position while cocking (smallest `y`).
    #[serde(default)]
    pub max_arm_height: Option<f64>,
}

impl SessionExport {
    /// Load an export previously written with [`SessionExport::save`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| ModelError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&json).map_err(|e| ModelError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Write the export as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ModelError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self).map_err(|e| ModelError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
        std::fs::write(path, json).map_err(|e| ModelError::IoError {
            path: path.to_path_buf(),
            source: e,
        })
    }
}
