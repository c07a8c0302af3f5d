use std::f64::consts::PI;

use crate::math::Point3;

/// Diameter of the sphere with the given volume.
#[must_use]
pub fn sphere_diameter(volume: f64) -> f64 {
    (6.0 * volume / PI).cbrt()
}

/// Cross-sectional area of a sphere of the given diameter.
#[must_use]
pub fn sphere_area(diameter: f64) -> f64 {
    PI / 4.0 * diameter * diameter
}

/// Compactness `P² / A` of a cross-section, zero for an empty one.
#[must_use]
pub fn compactness(perimeter: f64, area: f64) -> f64 {
    if area > 0.0 {
        perimeter * perimeter / area
    } else {
        0.0
    }
}

/// Length of the path from one pore centroid through the throat centroid to
/// the other pore centroid.
///
/// `NaN` when any centroid is unknown.
#[must_use]
pub fn center_to_center(
    throat: Option<Point3>,
    pore_1: Option<Point3>,
    pore_2: Option<Point3>,
) -> f64 {
    match (throat, pore_1, pore_2) {
        (Some(t), Some(a), Some(b)) => (t - a).norm() + (t - b).norm(),
        _ => f64::NAN,
    }
}
