//! Pose landmark types for the per-frame joint stream.
//!
//! Landmarks are produced by an external pose estimator and arrive as JSON
//! Lines, one frame per line:
//!
//! ```text
//! {"frame":12,"landmarks":[{"part":"right_wrist","x":0.61,"y":0.32,"z":-0.1,"visibility":0.97}]}
//! ```
//!
//! Blank lines and lines starting with `#` are ignored.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Body-part identifiers, in the pose estimator's 33-landmark index order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyPart {
    Nose,
    LeftEyeInner,
    LeftEye,
    LeftEyeOuter,
    RightEyeInner,
    RightEye,
    RightEyeOuter,
    LeftEar,
    RightEar,
    MouthLeft,
    MouthRight,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftPinky,
    RightPinky,
    LeftIndex,
    RightIndex,
    LeftThumb,
    RightThumb,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
    LeftHeel,
    RightHeel,
    LeftFootIndex,
    RightFootIndex,
}

impl BodyPart {
    /// All body parts in estimator index order.
    pub const ALL: [BodyPart; 33] = [
        BodyPart::Nose,
        BodyPart::LeftEyeInner,
        BodyPart::LeftEye,
        BodyPart::LeftEyeOuter,
        BodyPart::RightEyeInner,
        BodyPart::RightEye,
        BodyPart::RightEyeOuter,
        BodyPart::LeftEar,
        BodyPart::RightEar,
        BodyPart::MouthLeft,
        BodyPart::MouthRight,
        BodyPart::LeftShoulder,
        BodyPart::RightShoulder,
        BodyPart::LeftElbow,
        BodyPart::RightElbow,
        BodyPart::LeftWrist,
        BodyPart::RightWrist,
        BodyPart::LeftPinky,
        BodyPart::RightPinky,
        BodyPart::LeftIndex,
        BodyPart::RightIndex,
        BodyPart::LeftThumb,
        BodyPart::RightThumb,
        BodyPart::LeftHip,
        BodyPart::RightHip,
        BodyPart::LeftKnee,
        BodyPart::RightKnee,
        BodyPart::LeftAnkle,
        BodyPart::RightAnkle,
        BodyPart::LeftHeel,
        BodyPart::RightHeel,
        BodyPart::LeftFootIndex,
        BodyPart::RightFootIndex,
    ];

    /// Estimator landmark index.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Look up a body part by estimator landmark index.
    pub fn from_index(index: usize) -> Result<Self, ModelError> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or(ModelError::UnknownBodyPart { index })
    }
}

/// Left or right side of the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    #[default]
    Right,
    Left,
}

impl Side {
    /// The opposite arm.
    pub fn mirrored(self) -> Self {
        match self {
            Side::Right => Side::Left,
            Side::Left => Side::Right,
        }
    }

    pub fn shoulder(self) -> BodyPart {
        match self {
            Side::Right => BodyPart::RightShoulder,
            Side::Left => BodyPart::LeftShoulder,
        }
    }

    pub fn elbow(self) -> BodyPart {
        match self {
            Side::Right => BodyPart::RightElbow,
            Side::Left => BodyPart::LeftElbow,
        }
    }

    pub fn wrist(self) -> BodyPart {
        match self {
            Side::Right => BodyPart::RightWrist,
            Side::Left => BodyPart::LeftWrist,
        }
    }

    pub fn hip(self) -> BodyPart {
        match self {
            Side::Right => BodyPart::RightHip,
            Side::Left => BodyPart::LeftHip,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Side::Right => "right",
            Side::Left => "left",
        }
    }
}

impl FromStr for Side {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "right" | "r" => Ok(Side::Right),
            "left" | "l" => Ok(Side::Left),
            _ => Err(ModelError::UnknownSide {
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A point in normalized image space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Vector from `self` to `other`.
    pub fn to(self, other: Point3) -> Point3 {
        Point3::new(other.x - self.x, other.y - self.y, other.z - self.z)
    }

    pub fn dot(self, other: Point3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn norm(self) -> f64 {
        self.dot(self).sqrt()
    }
}

/// A single detected joint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    /// Which joint this is.
    pub part: BodyPart,
    /// Normalized X coordinate [0.0, 1.0].
    pub x: f64,
    /// Normalized Y coordinate [0.0, 1.0]; decreases upward.
    pub y: f64,
    /// Depth relative to the hips, in roughly the same scale as `x`.
    #[serde(default)]
    pub z: f64,
    /// Estimator confidence that the joint is visible [0.0, 1.0].
    /// Absent means the estimator did not report one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<f64>,
}

impl Landmark {
    pub fn new(part: BodyPart, x: f64, y: f64, z: f64) -> Self {
        Self {
            part,
            x,
            y,
            z,
            visibility: None,
        }
    }

    pub fn with_visibility(mut self, visibility: f64) -> Self {
        self.visibility = Some(visibility);
        self
    }

    pub fn position(&self) -> Point3 {
        Point3::new(self.x, self.y, self.z)
    }

    /// Whether the estimator considers this joint usable.
    pub fn is_visible(&self, min_visibility: f64) -> bool {
        self.visibility.map_or(true, |v| v >= min_visibility)
            && self.x.is_finite()
            && self.y.is_finite()
            && self.z.is_finite()
    }
}

/// All landmarks detected in one video frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandmarkFrame {
    /// 1-based frame index in the source video.
    #[serde(rename = "frame")]
    pub frame_index: u64,

    /// Detected joints. Joints the estimator did not find are simply absent.
    pub landmarks: Vec<Landmark>,
}

impl LandmarkFrame {
    pub fn new(frame_index: u64, landmarks: Vec<Landmark>) -> Self {
        Self {
            frame_index,
            landmarks,
        }
    }

    /// Look up a joint. If the estimator reported it twice, the first wins.
    pub fn get(&self, part: BodyPart) -> Option<&Landmark> {
        self.landmarks.iter().find(|l| l.part == part)
    }
}

/// Parse landmark frames from JSONL content (one JSON object per line).
pub fn parse_landmark_frames(jsonl: &str) -> Result<Vec<LandmarkFrame>, ModelError> {
    jsonl
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(line_no, line)| {
            serde_json::from_str(line).map_err(|source| ModelError::LineParseError {
                line: line_no,
                source,
            })
        })
        .collect()
}

/// Read and parse a landmark JSONL file.
pub fn load_landmark_frames(path: impl AsRef<Path>) -> Result<Vec<LandmarkFrame>, ModelError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ModelError::IoError {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_landmark_frames(&content)
}

/// Serialize landmark frames to JSONL format.
pub fn serialize_landmark_frames(frames: &[LandmarkFrame]) -> Result<String, serde_json::Error> {
    let mut output = String::new();
    for frame in frames {
        output.push_str(&serde_json::to_string(frame)?);
        output.push('\n');
    }
    Ok(output)
}

/// Errors that can occur when reading or interpreting model data.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error on line {line}: {source}")]
    LineParseError {
        line: usize,
        source: serde_json::Error,
    },

    #[error("Parse error in {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Unknown side {value:?} (expected \"right\" or \"left\")")]
    UnknownSide { value: String },

    #[error("Unknown body part index: {index}")]
    UnknownBodyPart { index: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_part_index_order() {
        assert_eq!(BodyPart::Nose.index(), 0);
        assert_eq!(BodyPart::LeftShoulder.index(), 11);
        assert_eq!(BodyPart::RightShoulder.index(), 12);
        assert_eq!(BodyPart::RightWrist.index(), 16);
        assert_eq!(BodyPart::RightHip.index(), 24);
        assert_eq!(BodyPart::RightFootIndex.index(), 32);
        for (i, part) in BodyPart::ALL.iter().enumerate() {
            assert_eq!(BodyPart::from_index(i).unwrap(), *part);
        }
    }

    #[test]
    fn test_body_part_from_unknown_index() {
        assert!(matches!(
            BodyPart::from_index(33),
            Err(ModelError::UnknownBodyPart { index: 33 })
        ));
    }

    #[test]
    fn test_side_joints_are_mirrored() {
        assert_eq!(Side::Right.shoulder(), BodyPart::RightShoulder);
        assert_eq!(Side::Left.wrist(), BodyPart::LeftWrist);
        assert_eq!(Side::Right.mirrored(), Side::Left);
        assert_eq!(Side::Left.mirrored().elbow(), BodyPart::RightElbow);
    }

    #[test]
    fn test_side_from_str() {
        assert_eq!("Right".parse::<Side>().unwrap(), Side::Right);
        assert_eq!(" l ".parse::<Side>().unwrap(), Side::Left);
        assert!("both".parse::<Side>().is_err());
    }

    #[test]
    fn test_visibility_gate() {
        let lm = Landmark::new(BodyPart::RightWrist, 0.5, 0.5, 0.0);
        assert!(lm.is_visible(0.5));
        assert!(!lm.with_visibility(0.3).is_visible(0.5));
        assert!(lm.with_visibility(0.5).is_visible(0.5));

        let nan = Landmark::new(BodyPart::RightWrist, f64::NAN, 0.5, 0.0);
        assert!(!nan.is_visible(0.0));
    }

    #[test]
    fn test_parse_skips_comments_and_blank_lines() {
        let jsonl = "# landmarks v1\n\n{\"frame\":1,\"landmarks\":[{\"part\":\"right_wrist\",\"x\":0.5,\"y\":0.4,\"z\":0.0,\"visibility\":0.9}]}\n";
        let frames = parse_landmark_frames(jsonl).unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].frame_index, 1);
        let wrist = frames[0].get(BodyPart::RightWrist).unwrap();
        assert_eq!(wrist.visibility, Some(0.9));
        assert!(frames[0].get(BodyPart::LeftWrist).is_none());
    }

    #[test]
    fn test_parse_reports_line_number() {
        let jsonl = "{\"frame\":1,\"landmarks\":[]}\n{\"frame\":2,\"landmarks\":[{\"part\":\"tail\",\"x\":0,\"y\":0}]}\n";
        match parse_landmark_frames(jsonl) {
            Err(ModelError::LineParseError { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected line parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_z_defaults_to_zero() {
        let frame: LandmarkFrame =
            serde_json::from_str(r#"{"frame":3,"landmarks":[{"part":"nose","x":0.5,"y":0.1}]}"#)
                .unwrap();
        let nose = frame.get(BodyPart::Nose).unwrap();
        assert_eq!(nose.z, 0.0);
        assert_eq!(nose.visibility, None);
    }

    #[test]
    fn test_jsonl_roundtrip() {
        let frames = vec![
            LandmarkFrame::new(
                1,
                vec![Landmark::new(BodyPart::RightShoulder, 0.5, 0.3, 0.0).with_visibility(0.99)],
            ),
            LandmarkFrame::new(2, vec![]),
        ];
        let jsonl = serialize_landmark_frames(&frames).unwrap();
        assert_eq!(parse_landmark_frames(&jsonl).unwrap(), frames);
    }

    #[test]
    fn test_point_vector_ops() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(3.0, 4.0, 0.0);
        let v = a.to(b);
        assert!((v.norm() - 5.0).abs() < 1e-12);
        assert!((v.dot(Point3::new(1.0, 0.0, 0.0)) - 3.0).abs() < 1e-12);
    }
}
