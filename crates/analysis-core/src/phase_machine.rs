//! Serve phase state machine.
//!
//! Consumes [`FrameMetrics`] one at a time, in frame order, and moves through
//! the serve phases. Transitions never go backwards.
//!
//! # Transitions
//!
//! | From | Leaves when | Records |
//! |---|---|---|
//! | Stance | wrist above 0.6 and abduction over 60° | stance window |
//! | Arm cocking | running-min elbow < 130° and elbow re-opened by 10° | trophy pose |
//! | Acceleration | speed < 0.6 × peak, peak > 0.3, over 3 frames past peak | contact point |
//! | Ball contact | next processed frame | - |
//! | Follow-through | never | window, on [`PhaseMachine::finish`] |
//!
//! The trophy pose and contact point are local extrema detected after the
//! signal has moved clearly past them, so their frame precedes the
//! transition frame. The margins (`+10°`, `×0.6`) keep single noisy frames
//! from triggering a transition.

use servecoach_pose_model::metrics::{FrameMetrics, PhaseTransition, ServePhase};
use servecoach_pose_model::summary::{ContactPoint, PhaseSummary, PhaseWindow, TrophyPose};

/// Tunable transition thresholds.
#[derive(Debug, Clone)]
pub struct PhaseThresholds {
    /// Stance ends once the wrist is higher (smaller `y`) than this.
    pub cocking_max_wrist_height: f64,

    /// ... and the upper arm is raised more than this many degrees.
    pub cocking_min_abduction: f64,

    /// The running-min elbow angle must be below this to count as a trophy pose.
    pub trophy_max_elbow_angle: f64,

    /// Degrees the elbow must re-open past its minimum to start acceleration.
    pub extension_margin: f64,

    /// Contact is detected once speed falls below this fraction of the peak.
    pub contact_velocity_ratio: f64,

    /// Peaks at or below this speed are not considered a swing.
    pub contact_min_peak_velocity: f64,

    /// Frames that must pass after the peak before contact can be detected.
    pub contact_min_frames_after_peak: u64,
}

impl Default for PhaseThresholds {
    fn default() -> Self {
        Self {
            cocking_max_wrist_height: 0.6,
            cocking_min_abduction: 60.0,
            trophy_max_elbow_angle: 130.0,
            extension_margin: 10.0,
            contact_velocity_ratio: 0.6,
            contact_min_peak_velocity: 0.3,
            contact_min_frames_after_peak: 3,
        }
    }
}

/// Running extrema. Each is `None` until its phase has seen a frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunningExtrema {
    pub min_elbow_angle: Option<f64>,
    pub min_elbow_frame: Option<u64>,
    /// Smallest wrist `y` while cocking, i.e. the highest arm position.
    pub max_arm_height: Option<f64>,
    pub max_wrist_velocity: Option<f64>,
    pub max_velocity_frame: Option<u64>,
    pub contact_frame: Option<u64>,
}

impl RunningExtrema {
    fn track_cocking(&mut self, metrics: &FrameMetrics) {
        if self
            .min_elbow_angle
            .map_or(true, |min| metrics.elbow_angle < min)
        {
            self.min_elbow_angle = Some(metrics.elbow_angle);
            self.min_elbow_frame = Some(metrics.frame_index);
        }
        if self
            .max_arm_height
            .map_or(true, |highest| metrics.wrist_height < highest)
        {
            self.max_arm_height = Some(metrics.wrist_height);
        }
    }

    fn track_acceleration(&mut self, metrics: &FrameMetrics) {
        if self
            .max_wrist_velocity
            .map_or(true, |max| metrics.wrist_velocity > max)
        {
            self.max_wrist_velocity = Some(metrics.wrist_velocity);
            self.max_velocity_frame = Some(metrics.frame_index);
        }
    }
}

/// The serve phase detector.
#[derive(Debug, Clone)]
pub struct PhaseMachine {
    thresholds: PhaseThresholds,
    current: ServePhase,
    /// Frame on which `current` was entered. `None` before the first frame.
    entered_frame: Option<u64>,
    /// Processed frames spent in `current` so far.
    frames_in_phase: u64,
    extrema: RunningExtrema,
    summary: PhaseSummary,
    transitions: Vec<PhaseTransition>,
    finished: bool,
}

impl PhaseMachine {
    pub fn new(thresholds: PhaseThresholds) -> Self {
        Self {
            thresholds,
            current: ServePhase::Stance,
            entered_frame: None,
            frames_in_phase: 0,
            extrema: RunningExtrema::default(),
            summary: PhaseSummary::new(),
            transitions: Vec::new(),
            finished: false,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(PhaseThresholds::default())
    }

    pub fn current_phase(&self) -> ServePhase {
        self.current
    }

    pub fn extrema(&self) -> &RunningExtrema {
        &self.extrema
    }

    pub fn summary(&self) -> &PhaseSummary {
        &self.summary
    }

    pub fn transitions(&self) -> &[PhaseTransition] {
        &self.transitions
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Consume one frame. Returns the transition it caused, if any.
    ///
    /// Frames must arrive in strictly increasing `frame_index` order; the
    /// caller guarantees this. Frames after [`finish`](Self::finish) are
    /// ignored.
    pub fn advance(&mut self, metrics: &FrameMetrics) -> Option<PhaseTransition> {
        if self.finished {
            return None;
        }
        if self.entered_frame.is_none() {
            self.entered_frame = Some(metrics.frame_index);
        }

        let next = match self.current {
            ServePhase::Stance => self.stance_exit(metrics),
            ServePhase::ArmCocking => {
                self.extrema.track_cocking(metrics);
                self.cocking_exit(metrics)
            }
            ServePhase::Acceleration => {
                self.extrema.track_acceleration(metrics);
                self.acceleration_exit(metrics)
            }
            // Contact lasts one frame; follow-through is terminal.
            ServePhase::BallContact | ServePhase::FollowThrough => self.current.next(),
        };

        let Some(next) = next else {
            self.frames_in_phase += 1;
            return None;
        };

        let transition = PhaseTransition {
            from: self.current,
            to: next,
            frame: metrics.frame_index,
        };
        self.current = next;
        self.entered_frame = Some(metrics.frame_index);
        self.frames_in_phase = 1;
        self.transitions.push(transition);

        tracing::info!(
            from = %transition.from,
            to = %transition.to,
            frame = transition.frame,
            "Serve phase transition"
        );

        Some(transition)
    }

    /// End-of-stream signal. Closes the follow-through window if the serve
    /// reached it. Idempotent.
    pub fn finish(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;

        if self.current.is_terminal() {
            if let Some(entered_frame) = self.entered_frame {
                self.summary.record_follow_through(PhaseWindow {
                    entered_frame,
                    frame_count: self.frames_in_phase,
                });
            }
        }
    }

    /// The window of the phase being left on this frame.
    fn closing_window(&self, metrics: &FrameMetrics) -> PhaseWindow {
        PhaseWindow {
            entered_frame: self.entered_frame.unwrap_or(metrics.frame_index),
            frame_count: self.frames_in_phase,
        }
    }

    fn stance_exit(&mut self, metrics: &FrameMetrics) -> Option<ServePhase> {
        let t = &self.thresholds;
        if metrics.wrist_height < t.cocking_max_wrist_height
            && metrics.shoulder_abduction > t.cocking_min_abduction
        {
            let window = self.closing_window(metrics);
            self.summary.record_stance(window);
            Some(ServePhase::ArmCocking)
        } else {
            None
        }
    }

    fn cocking_exit(&mut self, metrics: &FrameMetrics) -> Option<ServePhase> {
        let t = &self.thresholds;
        let (Some(min_elbow), Some(min_frame), Some(highest)) = (
            self.extrema.min_elbow_angle,
            self.extrema.min_elbow_frame,
            self.extrema.max_arm_height,
        ) else {
            return None;
        };

        if min_elbow < t.trophy_max_elbow_angle
            && metrics.elbow_angle > min_elbow + t.extension_margin
        {
            self.summary.record_trophy_pose(TrophyPose {
                frame: min_frame,
                elbow_flexion: min_elbow,
                wrist_height: highest,
            });
            tracing::debug!(
                frame = min_frame,
                elbow_flexion = min_elbow,
                "Trophy pose recorded"
            );
            Some(ServePhase::Acceleration)
        } else {
            None
        }
    }

    fn acceleration_exit(&mut self, metrics: &FrameMetrics) -> Option<ServePhase> {
        let t = &self.thresholds;
        let (Some(peak), Some(peak_frame)) = (
            self.extrema.max_wrist_velocity,
            self.extrema.max_velocity_frame,
        ) else {
            return None;
        };

        if metrics.wrist_velocity < t.contact_velocity_ratio * peak
            && peak > t.contact_min_peak_velocity
            && metrics.frame_index > peak_frame + t.contact_min_frames_after_peak
        {
            let window = self.closing_window(metrics);
            self.extrema.contact_frame = Some(peak_frame);
            self.summary.record_acceleration(window);
            self.summary.record_contact(ContactPoint {
                frame: peak_frame,
                shoulder_abduction: metrics.shoulder_abduction,
                elbow_extension: metrics.elbow_angle,
                max_velocity: peak,
            });
            tracing::debug!(
                frame = peak_frame,
                max_velocity = peak,
                "Contact point recorded"
            );
            Some(ServePhase::BallContact)
        } else {
            None
        }
    }
}

impl Default for PhaseMachine {
    fn default() -> Self {
        Self::with_defaults()
    }
}
