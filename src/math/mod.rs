pub mod polygon_2d;
pub mod polygon_3d;
pub mod rotation;

/// 2D point type.
pub type Point2 = nalgebra::Point2<f64>;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// 3x3 matrix, used for rotations.
pub type Matrix3 = nalgebra::Matrix3<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Rounds a value to `decimals` decimal places.
#[must_use]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Rounds every coordinate of a point to `decimals` decimal places.
#[must_use]
pub fn round_point(point: &Point3, decimals: i32) -> Point3 {
    point.map(|c| round_to(c, decimals))
}

/// Arithmetic mean of a point set, or `None` when the set is empty.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn mean_point(points: &[Point3]) -> Option<Point3> {
    if points.is_empty() {
        return None;
    }
    let sum = points
        .iter()
        .fold(Vector3::zeros(), |acc, p| acc + p.coords);
    Some(Point3::from(sum / points.len() as f64))
}

/// Removes points that coincide after rounding to `decimals` places.
///
/// Keeps the first occurrence and preserves order.
#[must_use]
pub fn unique_points(points: &[Point3], decimals: i32) -> Vec<Point3> {
    let mut unique: Vec<Point3> = Vec::with_capacity(points.len());
    for p in points {
        let rounded = round_point(p, decimals);
        if !unique.contains(&rounded) {
            unique.push(rounded);
        }
    }
    unique
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn round_to_six_places() {
        assert!((round_to(1.234_567_89, 6) - 1.234_568).abs() < TOLERANCE);
    }

    #[test]
    fn mean_of_empty_set_is_none() {
        assert!(mean_point(&[]).is_none());
    }

    #[test]
    fn mean_of_square_corners() {
        let pts = [
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(2.0, 0.0, 1.0),
            Point3::new(2.0, 2.0, 1.0),
            Point3::new(0.0, 2.0, 1.0),
        ];
        let m = mean_point(&pts).unwrap();
        assert!((m - Point3::new(1.0, 1.0, 1.0)).norm() < TOLERANCE);
    }

    #[test]
    fn unique_points_drops_near_duplicates() {
        let pts = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1e-9, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
        ];
        assert_eq!(unique_points(&pts, 6).len(), 2);
    }
}
