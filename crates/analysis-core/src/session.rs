//! One analysis run: extractor, phase machine, buffer, and feedback engine
//! wired together behind a synchronous push interface.
//!
//! The caller delivers frames in strictly increasing `frame_index` order and
//! signals end-of-stream with [`ServeSession::finish`] (or implicitly through
//! [`ServeSession::finalize`]). Independent sessions share no state.

use servecoach_common::clock::FrameClock;
use servecoach_common::config::AnalysisDefaults;
use servecoach_common::error::{ServeCoachError, ServeCoachResult};
use servecoach_pose_model::export::SessionExport;
use servecoach_pose_model::landmark::{LandmarkFrame, Side};
use servecoach_pose_model::metrics::{FrameMetrics, PhaseTransition, ServePhase};
use servecoach_pose_model::report::FeedbackReport;
use servecoach_pose_model::summary::PhaseSummary;

use crate::buffer::SessionBuffer;
use crate::extractor::{ExtractionError, ExtractorConfig, FrameMetricsExtractor, WristHistory};
use crate::feedback::{FeedbackEngine, FeedbackRules};
use crate::phase_machine::{PhaseMachine, PhaseThresholds};

/// Everything fixed at session start.
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    pub extractor: ExtractorConfig,
    pub thresholds: PhaseThresholds,
    pub rules: FeedbackRules,
}

impl SessionConfig {
    pub fn from_defaults(defaults: &AnalysisDefaults) -> ServeCoachResult<Self> {
        Ok(Self {
            extractor: ExtractorConfig::from_defaults(defaults)?,
            ..Default::default()
        })
    }
}

/// Result of pushing one landmark frame.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    /// The frame was measured and fed to the phase machine.
    Processed {
        metrics: FrameMetrics,
        transition: Option<PhaseTransition>,
    },
    /// The frame was unusable and left no trace besides the skip count.
    Skipped { reason: ExtractionError },
}

/// A single serve analysis session.
#[derive(Debug, Clone)]
pub struct ServeSession {
    extractor: FrameMetricsExtractor,
    machine: PhaseMachine,
    buffer: SessionBuffer,
    engine: FeedbackEngine,
    clock: FrameClock,
    wrist_history: WristHistory,
    /// Highest frame index delivered so far, processed or skipped.
    last_frame_index: Option<u64>,
}

impl ServeSession {
    pub fn new(config: SessionConfig) -> Self {
        let clock = FrameClock::start(config.extractor.frame_rate);
        Self::with_clock(config, clock)
    }

    /// Create a session with an explicit clock (for replaying saved sessions).
    pub fn with_clock(config: SessionConfig, clock: FrameClock) -> Self {
        Self {
            extractor: FrameMetricsExtractor::new(config.extractor),
            machine: PhaseMachine::new(config.thresholds),
            buffer: SessionBuffer::new(),
            engine: FeedbackEngine::new(config.rules),
            clock,
            wrist_history: WristHistory::new(),
            last_frame_index: None,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(SessionConfig::default())
    }

    pub fn current_phase(&self) -> ServePhase {
        self.machine.current_phase()
    }

    pub fn summary(&self) -> &PhaseSummary {
        self.machine.summary()
    }

    pub fn transitions(&self) -> &[PhaseTransition] {
        self.machine.transitions()
    }

    pub fn buffer(&self) -> &SessionBuffer {
        &self.buffer
    }

    pub fn serving_arm(&self) -> Side {
        self.extractor.config().arm.primary
    }

    pub fn is_finished(&self) -> bool {
        self.machine.is_finished()
    }

    /// Measure a landmark frame and, if usable, feed it to the phase machine.
    ///
    /// Unusable frames are not errors: they are counted and otherwise
    /// ignored, so running extrema and the previous wrist heights are
    /// untouched. Velocity is measured against the last processed frame of
    /// the same arm. Out-of-order frames and frames after end-of-stream are
    /// rejected.
    pub fn push_landmarks(&mut self, frame: &LandmarkFrame) -> ServeCoachResult<FrameOutcome> {
        self.check_order(frame.frame_index)?;

        match self.extractor.extract(frame, &self.wrist_history) {
            Ok(metrics) => {
                let transition = self.accept(metrics);
                Ok(FrameOutcome::Processed {
                    metrics,
                    transition,
                })
            }
            Err(reason) => {
                self.buffer.record_skip();
                tracing::debug!(frame = frame.frame_index, %reason, "Skipping frame");
                Ok(FrameOutcome::Skipped { reason })
            }
        }
    }

    /// Feed already-measured metrics to the phase machine.
    pub fn push_frame(&mut self, metrics: FrameMetrics) -> ServeCoachResult<Option<PhaseTransition>> {
        self.check_order(metrics.frame_index)?;
        Ok(self.accept(metrics))
    }

    /// Signal end-of-stream. Idempotent.
    pub fn finish(&mut self) {
        if !self.machine.is_finished() {
            tracing::info!(
                processed = self.buffer.len(),
                skipped = self.buffer.skipped(),
                phase = %self.machine.current_phase(),
                "Session finished"
            );
        }
        self.machine.finish();
    }

    /// End the stream and evaluate the feedback rules.
    ///
    /// Never fails: an empty session yields a report with no detected phases
    /// and a single generic recommendation.
    pub fn finalize(&mut self) -> FeedbackReport {
        self.finish();
        if self.buffer.is_empty() {
            tracing::warn!("Finalizing a session with no processed frames");
        }
        self.engine.evaluate(self.machine.summary())
    }

    /// Diagnostic snapshot. Pure read: repeated calls return equal exports.
    pub fn export(&self) -> SessionExport {
        self.buffer
            .export(&self.clock, self.serving_arm(), &self.machine)
    }

    fn check_order(&mut self, frame_index: u64) -> ServeCoachResult<()> {
        if self.machine.is_finished() {
            return Err(ServeCoachError::invalid_input(format!(
                "frame {frame_index} arrived after end-of-stream"
            )));
        }
        if frame_index == 0 {
            return Err(ServeCoachError::invalid_input(
                "frame indices start at 1",
            ));
        }
        if let Some(last) = self.last_frame_index {
            if frame_index <= last {
                return Err(ServeCoachError::invalid_input(format!(
                    "frame {frame_index} arrived after frame {last}"
                )));
            }
        }
        self.last_frame_index = Some(frame_index);
        Ok(())
    }

    fn accept(&mut self, metrics: FrameMetrics) -> Option<PhaseTransition> {
        let transition = self.machine.advance(&metrics);
        self.wrist_history.record(&metrics);
        self.buffer.push(metrics);

        let frame_rate = u64::from(self.clock.frame_rate());
        if metrics.frame_index % frame_rate == 0 {
            tracing::debug!(
                frame = metrics.frame_index,
                seconds = self.clock.frame_to_secs(metrics.frame_index),
                phase = %self.machine.current_phase(),
                "Analysis progress"
            );
        }
        transition
    }
}

impl Default for ServeSession {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use servecoach_pose_model::landmark::{BodyPart, Landmark};
    use servecoach_pose_model::report::RecommendationKind;

    fn metrics(frame_index: u64) -> FrameMetrics {
        FrameMetrics {
            frame_index,
            arm: Side::Right,
            elbow_angle: 170.0,
            shoulder_abduction: 20.0,
            wrist_height: 0.8,
            wrist_velocity: 0.0,
        }
    }

    fn arm_frame(frame_index: u64, wrist_y: f64) -> LandmarkFrame {
        LandmarkFrame::new(
            frame_index,
            vec![
                Landmark::new(BodyPart::RightShoulder, 0.5, 0.5, 0.0),
                Landmark::new(BodyPart::RightElbow, 0.5, 0.65, 0.0),
                Landmark::new(BodyPart::RightWrist, 0.52, wrist_y, 0.0),
                Landmark::new(BodyPart::RightHip, 0.5, 0.9, 0.0),
            ],
        )
    }

    fn cocking_metrics(
        frame_index: u64,
        elbow_angle: f64,
        shoulder_abduction: f64,
        wrist_height: f64,
    ) -> FrameMetrics {
        FrameMetrics {
            frame_index,
            elbow_angle,
            shoulder_abduction,
            wrist_height,
            ..metrics(frame_index)
        }
    }

    fn with_left_arm(mut frame: LandmarkFrame) -> LandmarkFrame {
        frame.landmarks.extend([
            Landmark::new(BodyPart::LeftShoulder, 0.4, 0.5, 0.0),
            Landmark::new(BodyPart::LeftElbow, 0.4, 0.7, 0.0),
            Landmark::new(BodyPart::LeftWrist, 0.4, 0.9, 0.0),
            Landmark::new(BodyPart::LeftHip, 0.4, 0.9, 0.0),
        ]);
        frame
    }

    #[test]
    fn test_mirrored_frame_during_acceleration_keeps_contact_point() {
        let mut session = ServeSession::with_defaults();
        session.push_frame(metrics(1)).unwrap();
        session.push_frame(cocking_metrics(2, 170.0, 90.0, 0.5)).unwrap();
        session.push_frame(cocking_metrics(3, 95.0, 90.0, 0.4)).unwrap();
        session.push_frame(cocking_metrics(4, 110.0, 90.0, 0.4)).unwrap();
        assert_eq!(session.current_phase(), ServePhase::Acceleration);

        session.push_landmarks(&with_left_arm(arm_frame(5, 0.35))).unwrap();
        session.push_landmarks(&with_left_arm(arm_frame(6, 0.25))).unwrap();

        // Serving elbow occluded: the left arm is measured for this frame only.
        let mut occluded = with_left_arm(arm_frame(7, 0.25));
        occluded.landmarks[1] = occluded.landmarks[1].with_visibility(0.1);
        let FrameOutcome::Processed { metrics: mirrored, .. } =
            session.push_landmarks(&occluded).unwrap()
        else {
            panic!("expected the mirrored arm to be measured");
        };
        assert_eq!(mirrored.arm, Side::Left);
        assert_eq!(mirrored.wrist_velocity, 0.0);

        let FrameOutcome::Processed { metrics: back, .. } = session
            .push_landmarks(&with_left_arm(arm_frame(8, 0.22)))
            .unwrap()
        else {
            panic!("expected a processed frame");
        };
        assert_eq!(back.arm, Side::Right);
        assert!((back.wrist_velocity - 0.9).abs() < 1e-9);

        session.push_landmarks(&with_left_arm(arm_frame(9, 0.21))).unwrap();
        session.push_landmarks(&with_left_arm(arm_frame(10, 0.205))).unwrap();
        assert_eq!(session.current_phase(), ServePhase::BallContact);

        let contact = session.summary().contact().copied().unwrap();
        assert_eq!(contact.frame, 6);
        assert!((contact.max_velocity - 3.0).abs() < 1e-9);

        let export = session.export();
        let max_velocity = export.summary_stats.max_wrist_velocity.unwrap();
        assert!((max_velocity - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_frame_rate_matches_reported_rate() {
        let config = SessionConfig {
            extractor: ExtractorConfig {
                frame_rate: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        let mut session = ServeSession::new(config);
        session.push_landmarks(&arm_frame(1, 0.80)).unwrap();
        let FrameOutcome::Processed { metrics, .. } =
            session.push_landmarks(&arm_frame(2, 0.70)).unwrap()
        else {
            panic!("expected a processed frame");
        };
        assert!((metrics.wrist_velocity - 0.1).abs() < 1e-9);
        assert_eq!(session.export().frame_rate, 1);
    }

    #[test]
    fn test_rejects_out_of_order_frames() {
        let mut session = ServeSession::with_defaults();
        session.push_frame(metrics(2)).unwrap();

        for bad in [0, 1, 2] {
            assert!(matches!(
                session.push_frame(metrics(bad)),
                Err(ServeCoachError::InvalidInput { .. })
            ));
        }
        assert_eq!(session.buffer().len(), 1);
        assert!(session.push_frame(metrics(5)).is_ok());
    }

    #[test]
    fn test_rejects_frames_after_finish() {
        let mut session = ServeSession::with_defaults();
        session.push_frame(metrics(1)).unwrap();
        session.finish();
        assert!(session.push_frame(metrics(2)).is_err());
        assert!(session.push_landmarks(&arm_frame(3, 0.8)).is_err());
    }

    #[test]
    fn test_skipped_frame_leaves_state_untouched() {
        let mut session = ServeSession::with_defaults();
        session.push_landmarks(&arm_frame(1, 0.80)).unwrap();

        let outcome = session
            .push_landmarks(&LandmarkFrame::new(2, vec![]))
            .unwrap();
        assert!(matches!(outcome, FrameOutcome::Skipped { .. }));
        assert_eq!(session.buffer().len(), 1);
        assert_eq!(session.buffer().skipped(), 1);

        // Velocity is measured against the last processed frame, not the gap.
        let FrameOutcome::Processed { metrics, .. } =
            session.push_landmarks(&arm_frame(3, 0.70)).unwrap()
        else {
            panic!("expected a processed frame");
        };
        assert!((metrics.wrist_velocity - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_skipped_frame_still_advances_order() {
        let mut session = ServeSession::with_defaults();
        session
            .push_landmarks(&LandmarkFrame::new(4, vec![]))
            .unwrap();
        assert!(session.push_frame(metrics(4)).is_err());
        assert!(session.push_frame(metrics(5)).is_ok());
    }

    #[test]
    fn test_empty_session_finalizes_to_generic_report() {
        let mut session = ServeSession::with_defaults();
        let report = session.finalize();
        assert!(report.phases_detected.is_empty());
        assert_eq!(report.recommendations.len(), 1);
        assert_eq!(
            report.recommendations[0].kind,
            RecommendationKind::GeneralPositive
        );
        assert!(session.is_finished());
    }

    #[test]
    fn test_export_reflects_configuration() {
        let config = SessionConfig::from_defaults(&AnalysisDefaults {
            serving_arm: "left".to_string(),
            frame_rate: 60,
            ..Default::default()
        })
        .unwrap();
        let session = ServeSession::new(config);
        let export = session.export();
        assert_eq!(export.serving_arm, Side::Left);
        assert_eq!(export.frame_rate, 60);
        assert_eq!(export, session.export());
    }
}
