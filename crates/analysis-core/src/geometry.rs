//! Joint angle geometry.
//!
//! All angles are returned in degrees. Zero-length vectors (coincident
//! joints) are reported as [`GeometryError::Degenerate`] instead of
//! producing NaN.

use servecoach_pose_model::landmark::Point3;

/// "Up" in image coordinates, where `y` decreases upward.
pub const UP: Point3 = Point3::new(0.0, -1.0, 0.0);

/// Vectors shorter than this are treated as zero-length.
const MIN_NORM: f64 = 1e-9;

/// Failure of an angle computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GeometryError {
    #[error("degenerate geometry: {segment} vector has zero length")]
    Degenerate { segment: &'static str },
}

/// Angle at `b` formed by the vectors `b→a` and `b→c`.
pub fn angle_at_vertex(a: Point3, b: Point3, c: Point3) -> Result<f64, GeometryError> {
    angle_between(b.to(a), "b→a", b.to(c), "b→c")
}

/// Angle between the upper arm (`shoulder→elbow`) and vertical.
///
/// 0° is an arm pointing straight up, 90° is horizontal, 180° hangs down.
pub fn abduction_from_vertical(shoulder: Point3, elbow: Point3) -> Result<f64, GeometryError> {
    angle_between(UP, "up", shoulder.to(elbow), "shoulder→elbow")
}

fn angle_between(
    u: Point3,
    u_name: &'static str,
    v: Point3,
    v_name: &'static str,
) -> Result<f64, GeometryError> {
    let u_norm = u.norm();
    if u_norm.is_nan() || u_norm <= MIN_NORM {
        return Err(GeometryError::Degenerate { segment: u_name });
    }
    let v_norm = v.norm();
    if v_norm.is_nan() || v_norm <= MIN_NORM {
        return Err(GeometryError::Degenerate { segment: v_name });
    }

    // Cancellation error can push the cosine slightly outside [-1, 1].
    let cosine = (u.dot(v) / (u_norm * v_norm)).clamp(-1.0, 1.0);
    Ok(cosine.acos().to_degrees())
}
