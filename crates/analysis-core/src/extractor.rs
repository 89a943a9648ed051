//! Frame metrics extraction.
//!
//! Converts one [`LandmarkFrame`] into a [`FrameMetrics`] record for a single
//! arm. Arm selection is an explicit policy: the primary (serving) arm is
//! measured first, and the mirrored arm is measured only when the primary
//! attempt itself fails. Each attempt is pure and independent.

use servecoach_common::config::AnalysisDefaults;
use servecoach_common::error::{ServeCoachError, ServeCoachResult};
use servecoach_pose_model::landmark::{BodyPart, Landmark, LandmarkFrame, Side};
use servecoach_pose_model::metrics::FrameMetrics;

use crate::geometry::{abduction_from_vertical, angle_at_vertex, GeometryError};

/// Which arm(s) to measure, in order of precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArmPolicy {
    /// Serving arm, always attempted first.
    pub primary: Side,
    /// Arm attempted only when the primary attempt fails.
    pub fallback: Option<Side>,
}

impl ArmPolicy {
    /// Measure `side`, falling back to the mirrored arm for unusable frames.
    pub fn with_mirror(side: Side) -> Self {
        Self {
            primary: side,
            fallback: Some(side.mirrored()),
        }
    }

    /// Measure `side` only.
    pub fn only(side: Side) -> Self {
        Self {
            primary: side,
            fallback: None,
        }
    }
}

impl Default for ArmPolicy {
    fn default() -> Self {
        Self::with_mirror(Side::Right)
    }
}

/// Configuration for the frame metrics extractor.
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Assumed constant frame rate, used only to scale wrist velocity.
    pub frame_rate: u32,

    /// Arm selection policy.
    pub arm: ArmPolicy,

    /// Landmarks below this visibility count as missing.
    pub min_visibility: f64,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            frame_rate: 30,
            arm: ArmPolicy::default(),
            min_visibility: 0.5,
        }
    }
}

impl ExtractorConfig {
    /// Build from application defaults. Fails on an unrecognized serving arm.
    pub fn from_defaults(defaults: &AnalysisDefaults) -> ServeCoachResult<Self> {
        let side: Side = defaults
            .serving_arm
            .parse()
            .map_err(|e| ServeCoachError::config(format!("{e}")))?;
        let arm = if defaults.mirror_fallback {
            ArmPolicy::with_mirror(side)
        } else {
            ArmPolicy::only(side)
        };
        Ok(Self {
            frame_rate: defaults.frame_rate.max(1),
            arm,
            min_visibility: defaults.min_visibility,
        })
    }
}

/// Why a frame could not be measured. Frame-level and non-fatal.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExtractionError {
    #[error("missing or low-visibility landmark: {part:?}")]
    MissingLandmark { part: BodyPart },

    #[error("{side} arm: {source}")]
    Degenerate {
        side: Side,
        #[source]
        source: GeometryError,
    },
}

/// Last processed wrist height of each arm. Velocity is only measured
/// against the same arm.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WristHistory {
    right: Option<f64>,
    left: Option<f64>,
}

impl WristHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_height(&self, side: Side) -> Option<f64> {
        match side {
            Side::Right => self.right,
            Side::Left => self.left,
        }
    }

    pub fn record(&mut self, metrics: &FrameMetrics) {
        match metrics.arm {
            Side::Right => self.right = Some(metrics.wrist_height),
            Side::Left => self.left = Some(metrics.wrist_height),
        }
    }
}

/// Vertical wrist speed between consecutive processed frames of one arm.
pub fn wrist_velocity(previous_height: Option<f64>, current_height: f64, frame_rate: u32) -> f64 {
    match previous_height {
        Some(previous) => (previous - current_height).abs() * frame_rate as f64,
        None => 0.0,
    }
}

/// Stateless landmark → metrics converter.
#[derive(Debug, Clone)]
pub struct FrameMetricsExtractor {
    config: ExtractorConfig,
}

impl FrameMetricsExtractor {
    pub fn new(mut config: ExtractorConfig) -> Self {
        config.frame_rate = config.frame_rate.max(1);
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(ExtractorConfig::default())
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Measure a frame according to the arm policy.
    ///
    /// Each attempt measures velocity against `history` for its own arm. On
    /// failure of both attempts the primary arm's error is returned.
    pub fn extract(
        &self,
        frame: &LandmarkFrame,
        history: &WristHistory,
    ) -> Result<FrameMetrics, ExtractionError> {
        let primary_side = self.config.arm.primary;
        let primary = self.extract_arm(frame, primary_side, history.last_height(primary_side));
        let primary_err = match primary {
            Ok(metrics) => return Ok(metrics),
            Err(err) => err,
        };

        let Some(fallback) = self.config.arm.fallback else {
            return Err(primary_err);
        };

        match self.extract_arm(frame, fallback, history.last_height(fallback)) {
            Ok(metrics) => {
                tracing::debug!(
                    frame = frame.frame_index,
                    reason = %primary_err,
                    arm = %fallback,
                    "Primary arm unusable, measured mirrored arm"
                );
                Ok(metrics)
            }
            Err(_) => Err(primary_err),
        }
    }

    /// Measure one specific arm. `previous_wrist_height` is that arm's wrist
    /// height on its last processed frame.
    ///
    /// Estimators may place a wrist slightly outside the image; the height
    /// is clamped to [0, 1] before it is stored or differentiated.
    pub fn extract_arm(
        &self,
        frame: &LandmarkFrame,
        side: Side,
        previous_wrist_height: Option<f64>,
    ) -> Result<FrameMetrics, ExtractionError> {
        let shoulder = self.require(frame, side.shoulder())?.position();
        let elbow = self.require(frame, side.elbow())?.position();
        let wrist = self.require(frame, side.wrist())?;
        // Without the hip the torso is not tracked and the arm is unreliable.
        self.require(frame, side.hip())?;

        let degenerate = |source| ExtractionError::Degenerate { side, source };
        let elbow_angle = angle_at_vertex(shoulder, elbow, wrist.position()).map_err(degenerate)?;
        let shoulder_abduction = abduction_from_vertical(shoulder, elbow).map_err(degenerate)?;
        let wrist_height = wrist.y.clamp(0.0, 1.0);

        Ok(FrameMetrics {
            frame_index: frame.frame_index,
            arm: side,
            elbow_angle,
            shoulder_abduction,
            wrist_height,
            wrist_velocity: wrist_velocity(
                previous_wrist_height,
                wrist_height,
                self.config.frame_rate,
            ),
        })
    }

    fn require<'a>(
        &self,
        frame: &'a LandmarkFrame,
        part: BodyPart,
    ) -> Result<&'a Landmark, ExtractionError> {
        frame
            .get(part)
            .filter(|landmark| landmark.is_visible(self.config.min_visibility))
            .ok_or(ExtractionError::MissingLandmark { part })
    }
}
