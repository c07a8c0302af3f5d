use super::{Matrix3, Point3, Vector3, TOLERANCE};

/// Builds a 3x3 rotation matrix around a unit axis by an angle (Rodrigues).
#[must_use]
#[allow(clippy::many_single_char_names)]
pub fn rotation_matrix(axis: &Vector3, angle: f64) -> Matrix3 {
    let c = angle.cos();
    let s = angle.sin();
    let t = 1.0 - c;
    let (x, y, z) = (axis.x, axis.y, axis.z);

    #[allow(clippy::suspicious_operation_groupings)]
    Matrix3::new(
        t * x * x + c,     t * x * y - s * z, t * x * z + s * y,
        t * x * y + s * z, t * y * y + c,     t * y * z - s * x,
        t * x * z - s * y, t * y * z + s * x, t * z * z + c,
    )
}

/// Angle in radians between two vectors, in `[0, π]`.
///
/// Returns `0.0` when either vector has zero length.
#[must_use]
pub fn angle_between(a: &Vector3, b: &Vector3) -> f64 {
    let denom = a.norm() * b.norm();
    if denom < TOLERANCE {
        return 0.0;
    }
    (a.dot(b) / denom).clamp(-1.0, 1.0).acos()
}

/// Rotation that maps `normal` onto `reference`.
///
/// Returns `None` when the two are already parallel or anti-parallel
/// (angle 0 or π), in which case no rotation is needed to make the
/// plane perpendicular to `reference`.
#[must_use]
pub fn align_with(normal: &Vector3, reference: &Vector3) -> Option<Matrix3> {
    let axis = normal.cross(reference);
    let axis_len = axis.norm();
    if axis_len < TOLERANCE * normal.norm().max(1.0) {
        return None;
    }
    let angle = angle_between(normal, reference);
    Some(rotation_matrix(&(axis / axis_len), angle))
}

/// Applies a rotation matrix to every point of a slice.
#[must_use]
pub fn rotate_points(points: &[Point3], rotation: &Matrix3) -> Vec<Point3> {
    points.iter().map(|p| Point3::from(rotation * p.coords)).collect()
}
