//! Append-only session buffer and export assembly.

use servecoach_common::clock::FrameClock;
use servecoach_pose_model::export::{PhaseSnapshots, SessionExport, SummaryStats};
use servecoach_pose_model::landmark::Side;
use servecoach_pose_model::metrics::FrameMetrics;

use crate::phase_machine::PhaseMachine;

/// Every processed frame of one session, in arrival order.
///
/// Frames are retained for the life of the session; long recordings grow
/// this linearly.
#[derive(Debug, Clone, Default)]
pub struct SessionBuffer {
    frames: Vec<FrameMetrics>,
    skipped: u64,
}

impl SessionBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, metrics: FrameMetrics) {
        self.frames.push(metrics);
    }

    /// Count a frame that produced no metrics.
    pub fn record_skip(&mut self) {
        self.skipped += 1;
    }

    pub fn frames(&self) -> &[FrameMetrics] {
        &self.frames
    }

    pub fn last(&self) -> Option<&FrameMetrics> {
        self.frames.last()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    /// Snapshot the buffer together with the machine's phase records.
    pub fn export(
        &self,
        clock: &FrameClock,
        serving_arm: Side,
        machine: &PhaseMachine,
    ) -> SessionExport {
        let summary = machine.summary();
        let extrema = machine.extrema();

        SessionExport {
            started_at: clock.started_at().to_string(),
            frame_rate: clock.frame_rate(),
            serving_arm,
            total_frames: self.frames.len() as u64,
            skipped_frames: self.skipped,
            final_phase: machine.current_phase(),
            transitions: machine.transitions().to_vec(),
            phases: PhaseSnapshots {
                trophy_pose: summary.trophy_pose().copied(),
                ball_contact: summary.contact().copied(),
            },
            all_frames: self.frames.clone(),
            summary_stats: SummaryStats {
                min_elbow_angle: extrema.min_elbow_angle,
                min_elbow_frame: extrema.min_elbow_frame,
                max_wrist_velocity: extrema.max_wrist_velocity,
                contact_frame: extrema.contact_frame,
                max_arm_height: extrema.max_arm_height,
            },
        }
    }
}
