use tracing::debug;

use crate::math::polygon_3d::{order_along_hull, projection_axis};
use crate::math::Point3;

/// Samples points along the closed boundary of every facet polygon.
///
/// Each facet is ordered along the convex hull of its projection onto the
/// coordinate plane closest to its own. Every edge, including the closing one, receives
/// `ceil(length / spacing)` evenly spaced samples starting at its first
/// vertex. A sample equal to the previously emitted one is skipped.
/// Facets that do not span an area are skipped.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
pub fn facet_edge_points(facets: &[Vec<Point3>], spacing: f64) -> Vec<Point3> {
    let mut samples: Vec<Point3> = Vec::new();
    for facet in facets {
        if facet.len() < 3 {
            debug!(vertices = facet.len(), "skipping facet with fewer than 3 vertices");
            continue;
        }
        let Some(axis) = projection_axis(facet) else {
            debug!("skipping collinear facet");
            continue;
        };
        let ordered = match order_along_hull(facet, axis) {
            Ok(ordered) => ordered,
            Err(err) => {
                debug!(%err, "skipping facet without hull");
                continue;
            }
        };

        let n = ordered.len();
        for i in 0..n {
            let start = ordered[(i + n - 1) % n];
            let end = ordered[i];
            let edge = end - start;
            let steps = (edge.norm() / spacing).ceil() as usize;
            for s in 0..steps {
                let t = if steps > 1 {
                    s as f64 / (steps - 1) as f64
                } else {
                    0.0
                };
                let point = start + edge * t;
                if samples.last() != Some(&point) {
                    samples.push(point);
                }
            }
        }
    }
    samples
}
