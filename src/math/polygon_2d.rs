use spade::{DelaunayTriangulation, HasPosition, InsertionError, Point2 as SpadePoint2, Triangulation};

use super::{Point2, TOLERANCE};
use crate::error::{GeometryError, Result};

/// Computes the signed area of a 2D polygon (shoelace formula).
///
/// Positive for counter-clockwise, negative for clockwise.
#[must_use]
pub fn signed_area_2d(points: &[Point2]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += points[i].x * points[j].y - points[j].x * points[i].y;
    }
    sum * 0.5
}

/// Vertex carried through the Delaunay triangulation so hull vertices can be
/// mapped back to their input position.
#[derive(Debug, Clone, Copy)]
struct HullVertex {
    position: SpadePoint2<f64>,
    index: usize,
}

impl HasPosition for HullVertex {
    type Scalar = f64;

    fn position(&self) -> SpadePoint2<f64> {
        self.position
    }
}

/// Orders a 2D point set along its convex hull.
///
/// Returns the indices of the hull vertices in counter-clockwise order.
/// Interior points are discarded. Coincident inputs are reported once.
///
/// # Errors
///
/// Returns `GeometryError::Degenerate` if fewer than 3 points are given,
/// if the points are collinear, or if a coordinate cannot be triangulated
/// (NaN or out of range).
pub fn convex_hull_order(points: &[Point2]) -> Result<Vec<usize>> {
    if points.len() < 3 {
        return Err(GeometryError::Degenerate(format!(
            "convex hull needs at least 3 points, got {}",
            points.len()
        ))
        .into());
    }

    let mut triangulation: DelaunayTriangulation<HullVertex> = DelaunayTriangulation::new();
    for (index, p) in points.iter().enumerate() {
        triangulation
            .insert(HullVertex {
                position: SpadePoint2::new(p.x, p.y),
                index,
            })
            .map_err(|e: InsertionError| {
                GeometryError::Degenerate(format!("hull vertex {index} rejected: {e}"))
            })?;
    }

    if triangulation.num_inner_faces() == 0 {
        return Err(GeometryError::Degenerate("2D point set is collinear".into()).into());
    }

    let mut order: Vec<usize> = triangulation
        .convex_hull()
        .map(|edge| edge.from().data().index)
        .collect();

    let ordered: Vec<Point2> = order.iter().map(|&i| points[i]).collect();
    if signed_area_2d(&ordered) < 0.0 {
        order.reverse();
    }
    Ok(order)
}

/// Tests whether `point` lies inside or on a counter-clockwise convex polygon.
///
/// `tolerance` widens the polygon by that distance along each edge normal.
#[must_use]
pub fn point_in_convex_polygon(point: &Point2, polygon: &[Point2], tolerance: f64) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }
    for i in 0..n {
        let a = polygon[i];
        let b = polygon[(i + 1) % n];
        let edge = b - a;
        let len = edge.norm();
        if len < TOLERANCE {
            continue;
        }
        let cross = edge.x * (point.y - a.y) - edge.y * (point.x - a.x);
        if cross / len < -tolerance {
            return false;
        }
    }
    true
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    fn unit_square() -> Vec<Point2> {
        vec![p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0), p(0.0, 1.0)]
    }

    #[test]
    fn signed_area_ccw_square() {
        assert!((signed_area_2d(&unit_square()) - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn signed_area_cw_square() {
        let mut sq = unit_square();
        sq.reverse();
        assert!((signed_area_2d(&sq) + 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn hull_order_drops_interior_point() {
        let pts = vec![p(0.0, 0.0), p(2.0, 2.0), p(0.5, 0.5), p(2.0, 0.0), p(0.0, 2.0)];
        let order = convex_hull_order(&pts).unwrap();
        assert_eq!(order.len(), 4);
        assert!(!order.contains(&2));
        let ordered: Vec<Point2> = order.iter().map(|&i| pts[i]).collect();
        assert!((signed_area_2d(&ordered) - 4.0).abs() < TOLERANCE);
    }

    #[test]
    fn hull_order_of_shuffled_square_is_ccw() {
        let pts = vec![p(1.0, 1.0), p(0.0, 0.0), p(0.0, 1.0), p(1.0, 0.0)];
        let order = convex_hull_order(&pts).unwrap();
        let ordered: Vec<Point2> = order.iter().map(|&i| pts[i]).collect();
        assert!(signed_area_2d(&ordered) > 0.0);
    }

    #[test]
    fn collinear_points_are_degenerate() {
        let pts = vec![p(0.0, 0.0), p(1.0, 1.0), p(2.0, 2.0)];
        assert!(convex_hull_order(&pts).is_err());
    }

    #[test]
    fn too_few_points_are_degenerate() {
        assert!(convex_hull_order(&[p(0.0, 0.0), p(1.0, 0.0)]).is_err());
    }

    #[test]
    fn convex_containment_includes_boundary() {
        let sq = unit_square();
        assert!(point_in_convex_polygon(&p(0.5, 0.5), &sq, 1e-9));
        assert!(point_in_convex_polygon(&p(1.0, 0.5), &sq, 1e-9));
        assert!(!point_in_convex_polygon(&p(1.1, 0.5), &sq, 1e-9));
    }
}
