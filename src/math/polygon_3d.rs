use super::polygon_2d::convex_hull_order;
use super::{Point2, Point3, Vector3, TOLERANCE};
use crate::error::Result;

/// Coordinate axis of a 3D point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// The two remaining axes, in ascending order, once `self` is dropped.
    #[must_use]
    pub fn kept(self) -> (usize, usize) {
        match self {
            Axis::X => (1, 2),
            Axis::Y => (0, 2),
            Axis::Z => (0, 1),
        }
    }
}

/// Normal of the plane through a point set, from the widest triangle
/// anchored at the first point.
///
/// The vertices need not be ordered. Returns `None` when the points are
/// collinear or coincident.
fn plane_normal(points: &[Point3]) -> Option<Vector3> {
    let o = *points.first()?;
    let a = points
        .iter()
        .max_by(|p, q| (*p - o).norm().total_cmp(&(*q - o).norm()))?;
    let ab = a - o;
    let extent = ab.norm();
    if extent < TOLERANCE {
        return None;
    }
    let b = points
        .iter()
        .max_by(|p, q| ab.cross(&(*p - o)).norm().total_cmp(&ab.cross(&(*q - o)).norm()))?;
    let n = ab.cross(&(b - o));
    (n.norm() >= TOLERANCE * extent * extent).then_some(n)
}

/// Axis to drop when projecting a planar polygon to 2D.
///
/// This is the axis along the largest normal component, so the projection
/// keeps the polygon's shape non-degenerate for any plane orientation.
/// Returns `None` for collinear or coincident points.
#[must_use]
pub fn projection_axis(points: &[Point3]) -> Option<Axis> {
    let n = plane_normal(points)?.abs();
    Some(if n.x > n.y && n.x > n.z {
        Axis::X
    } else if n.y > n.z {
        Axis::Y
    } else {
        Axis::Z
    })
}

/// Projects points onto the plane spanned by the two axes kept after
/// dropping `axis`.
#[must_use]
pub fn project_dropping(points: &[Point3], axis: Axis) -> Vec<Point2> {
    let (a, b) = axis.kept();
    points.iter().map(|p| Point2::new(p[a], p[b])).collect()
}

/// Reorders a planar polygon along its convex hull, using `axis` as the
/// projection direction.
///
/// # Errors
///
/// Returns `GeometryError::Degenerate` if the projection is collinear or has
/// fewer than 3 points.
pub fn order_along_hull(points: &[Point3], axis: Axis) -> Result<Vec<Point3>> {
    let order = convex_hull_order(&project_dropping(points, axis))?;
    Ok(order.into_iter().map(|i| points[i]).collect())
}

/// Normal of a planar facet, taken from its hull-ordered vertices.
///
/// The result is `(v1 - v0) x (v_last - v0)` and is not normalized; its
/// length is zero for degenerate facets.
#[must_use]
pub fn facet_normal(points: &[Point3]) -> Vector3 {
    let Some(axis) = projection_axis(points) else {
        return Vector3::zeros();
    };
    let Ok(sorted) = order_along_hull(points, axis) else {
        return Vector3::zeros();
    };
    let (Some(first), Some(last)) = (sorted.first(), sorted.last()) else {
        return Vector3::zeros();
    };
    let v1 = sorted[1] - first;
    let v2 = last - first;
    v1.cross(&v2)
}

/// Checks that a point set spans a non-zero volume.
///
/// Compares the largest tetrahedron formed with the first point against the
/// cube of the set's extent, so the test is scale independent.
#[must_use]
pub fn spans_volume(points: &[Point3]) -> bool {
    if points.len() < 4 || points.iter().any(|p| !p.iter().all(|c| c.is_finite())) {
        return false;
    }
    let Some(n) = plane_normal(points) else {
        return false;
    };
    let o = points[0];
    let extent = points
        .iter()
        .map(|p| (p - o).norm())
        .fold(0.0_f64, f64::max);
    let height = points
        .iter()
        .map(|p| n.dot(&(p - o)).abs())
        .fold(0.0_f64, f64::max);
    height > 1e-9 * extent * extent * extent
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn v(x: f64, y: f64, z: f64) -> Vector3 {
        Vector3::new(x, y, z)
    }

    fn unit_square() -> Vec<Point3> {
        vec![
            p(0.0, 0.0, 0.0),
            p(1.0, 0.0, 0.0),
            p(1.0, 1.0, 0.0),
            p(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn projection_axis_follows_the_normal() {
        let upright = vec![p(2.0, 0.0, 0.0), p(2.0, 1.0, 0.0), p(2.0, 1.0, 1.0)];
        assert_eq!(projection_axis(&upright), Some(Axis::X));
        let flat = vec![p(0.0, 0.1, 0.0), p(0.0, 0.0, 5.0), p(5.0, 0.0, 5.0)];
        assert_eq!(projection_axis(&flat), Some(Axis::Y));
        assert_eq!(projection_axis(&[p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0)]), None);
    }

    #[test]
    fn diagonal_vertical_facet_has_a_normal() {
        let pts = vec![
            p(0.0, 0.0, 0.0),
            p(10.0, 10.0, 0.0),
            p(10.0, 10.0, 10.0),
            p(0.0, 0.0, 10.0),
        ];
        assert_eq!(order_along_hull(&pts, projection_axis(&pts).unwrap()).unwrap().len(), 4);
        let n = facet_normal(&pts).normalize();
        let expected = v(1.0, -1.0, 0.0).normalize();
        assert!((n.dot(&expected).abs() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn normal_of_xy_square_is_along_z() {
        let n = facet_normal(&unit_square());
        assert!(n.x.abs() < TOLERANCE && n.y.abs() < TOLERANCE);
        assert!((n.z.abs() - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn normal_of_tilted_facet() {
        let pts = vec![p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0), p(0.0, 0.0, 1.0)];
        let n = facet_normal(&pts).normalize();
        let expected = v(1.0, 1.0, 1.0).normalize();
        assert!((n.dot(&expected).abs() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn degenerate_facet_has_zero_normal() {
        let pts = vec![p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(2.0, 0.0, 0.0)];
        assert!(facet_normal(&pts).norm() < TOLERANCE);
    }

    #[test]
    fn tetrahedron_spans_volume() {
        let pts = vec![
            p(0.0, 0.0, 0.0),
            p(1.0, 0.0, 0.0),
            p(0.0, 1.0, 0.0),
            p(0.0, 0.0, 1.0),
        ];
        assert!(spans_volume(&pts));
    }

    #[test]
    fn flat_set_spans_no_volume() {
        let mut pts = unit_square();
        pts.push(p(0.5, 0.5, 0.0));
        assert!(!spans_volume(&pts));
        assert!(!spans_volume(&pts[..3]));
    }
}
