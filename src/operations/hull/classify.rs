use parry3d_f64::transformation::convex_hull;
use tracing::debug;

use crate::error::{GeometryError, Result};
use crate::image::Grid3;
use crate::math::polygon_3d::spans_volume;
use crate::math::{mean_point, Point3, Vector3, TOLERANCE};

/// Default tolerance of the half-space test, in voxel units.
pub const DEFAULT_HULL_TOLERANCE: f64 = 1e-7;

/// Voxels of a grid sub-region classified against a convex hull.
#[derive(Debug, Clone)]
pub struct HullRegion {
    /// First voxel of the region in the grid.
    pub start: [usize; 3],
    /// Region extent in voxels. All zero when the hull misses the grid.
    pub shape: [usize; 3],
    /// Inside flag per region voxel, x-major.
    pub inside: Vec<bool>,
}

impl HullRegion {
    /// Number of voxels inside the hull.
    #[must_use]
    pub fn count(&self) -> usize {
        self.inside.iter().filter(|&&v| v).count()
    }

    /// Writes `label` into every inside voxel of `labels`.
    ///
    /// Voxels already owned by another label are overwritten. Returns the
    /// number of voxels taken over from another label.
    pub fn merge_into(&self, labels: &mut Grid3<i32>, label: i32) -> usize {
        let [sx, sy, sz] = self.shape;
        let mut overwritten = 0;
        for i in 0..sx {
            for j in 0..sy {
                for k in 0..sz {
                    if !self.inside[(i * sy + j) * sz + k] {
                        continue;
                    }
                    let (gi, gj, gk) = (self.start[0] + i, self.start[1] + j, self.start[2] + k);
                    let previous = *labels.get(gi, gj, gk);
                    if previous >= 0 && previous != label {
                        overwritten += 1;
                    }
                    labels.set(gi, gj, gk, label);
                }
            }
        }
        overwritten
    }
}

/// Classifies the voxels of a grid against the convex hull of a point set.
///
/// Points are given in voxel units relative to the grid origin, so voxel
/// `(i, j, k)` has its centre at `(i + ½, j + ½, k + ½)`. Only the voxels in
/// the bounding box of the points are tested.
pub struct ClassifyHull<'a> {
    points: &'a [Point3],
    grid_shape: [usize; 3],
    tolerance: f64,
}

impl<'a> ClassifyHull<'a> {
    /// Creates a new `ClassifyHull` operation.
    #[must_use]
    pub fn new(points: &'a [Point3], grid_shape: [usize; 3]) -> Self {
        Self {
            points,
            grid_shape,
            tolerance: DEFAULT_HULL_TOLERANCE,
        }
    }

    /// Sets the tolerance of the half-space test.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Executes the classification.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::Degenerate` if the points do not span a
    /// volume (fewer than 4 points, coplanar, or non-finite).
    #[allow(clippy::cast_precision_loss)]
    pub fn execute(&self) -> Result<HullRegion> {
        let planes = self.hull_planes()?;
        let (start, shape) = self.bounding_region();
        let [sx, sy, sz] = shape;
        let mut inside = vec![true; sx * sy * sz];

        for (normal, offset) in &planes {
            for i in 0..sx {
                let x = (start[0] + i) as f64 + 0.5;
                for j in 0..sy {
                    let y = (start[1] + j) as f64 + 0.5;
                    let row = (i * sy + j) * sz;
                    for k in 0..sz {
                        let z = (start[2] + k) as f64 + 0.5;
                        let signed = normal.x * x + normal.y * y + normal.z * z - offset;
                        if signed < -self.tolerance {
                            inside[row + k] = false;
                        }
                    }
                }
            }
        }

        Ok(HullRegion {
            start,
            shape,
            inside,
        })
    }

    /// Inward unit normals and plane constants of the hull facets.
    fn hull_planes(&self) -> Result<Vec<(Vector3, f64)>> {
        if !spans_volume(self.points) {
            return Err(GeometryError::Degenerate(format!(
                "hull of {} points spans no volume",
                self.points.len()
            ))
            .into());
        }

        let (vertices, triangles) = convex_hull(self.points);
        if triangles.len() < 4 {
            return Err(GeometryError::Degenerate(format!(
                "hull triangulation produced {} facets",
                triangles.len()
            ))
            .into());
        }
        let center = mean_point(self.points)
            .ok_or_else(|| GeometryError::Degenerate("empty point set".into()))?;

        let mut planes = Vec::with_capacity(triangles.len());
        for tri in &triangles {
            let a = vertices[tri[0] as usize];
            let b = vertices[tri[1] as usize];
            let c = vertices[tri[2] as usize];
            let normal = (a - b).cross(&(a - c));
            let len = normal.norm();
            if len < TOLERANCE {
                debug!("skipping sliver hull facet");
                continue;
            }
            let mut normal = normal / len;
            if (center - a).dot(&normal) < 0.0 {
                normal = -normal;
            }
            planes.push((normal, normal.dot(&a.coords)));
        }
        Ok(planes)
    }

    /// Voxel box covering the points, clamped to the grid.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    fn bounding_region(&self) -> ([usize; 3], [usize; 3]) {
        let mut start = [0usize; 3];
        let mut shape = [0usize; 3];
        for axis in 0..3 {
            let lo = self
                .points
                .iter()
                .map(|p| p[axis])
                .fold(f64::INFINITY, f64::min);
            let hi = self
                .points
                .iter()
                .map(|p| p[axis])
                .fold(f64::NEG_INFINITY, f64::max);
            // voxel centres at i + 0.5 inside [lo, hi], widened by one voxel
            let first = (lo - 0.5).floor().max(0.0);
            let last = (hi - 0.5).ceil().min(self.grid_shape[axis] as f64 - 1.0);
            if last < first {
                return ([0; 3], [0; 3]);
            }
            start[axis] = first as usize;
            shape[axis] = (last - first) as usize + 1;
        }
        (start, shape)
    }
}
