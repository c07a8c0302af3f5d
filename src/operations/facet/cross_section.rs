use tracing::{debug, warn};

use crate::error::Result;
use crate::image::{convex_hull_fill, distance_transform, label_regions, region_props, Grid2, Labels};
use crate::math::rotation::{align_with, rotate_points};
use crate::math::{Matrix3, Point2, Point3, Vector3, TOLERANCE};

/// Default pixel span of the larger side of a facet image.
pub const DEFAULT_FACET_RESOLUTION: usize = 200;

/// Outcome of the erosion of a throat facet by the fibres.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FacetStatus {
    /// A single open region remains.
    #[default]
    Open,
    /// The fibres close the throat.
    Occluded,
    /// Erosion split the facet into several regions.
    MultiRegion,
}

/// Cross-section of a throat facet after erosion by the fibres.
///
/// Lengths and coordinates are in network units. All scalars are zero and
/// `offset_vertices` is empty unless the status is [`FacetStatus::Open`].
#[derive(Debug, Clone)]
pub struct FacetSection {
    /// Whether the facet stays open after erosion.
    pub status: FacetStatus,
    /// Open area.
    pub area: f64,
    /// Perimeter of the open area.
    pub perimeter: f64,
    /// Equivalent circle diameter of the open area.
    pub diameter: f64,
    /// Radius of the largest inscribed circle.
    pub inradius: f64,
    /// Centroid of the open area.
    pub centroid: Option<Point3>,
    /// Centre of the largest inscribed circle.
    pub incenter: Option<Point3>,
    /// Polygon of the open area, one vertex per original facet corner.
    pub offset_vertices: Vec<Point3>,
}

impl FacetSection {
    fn closed(status: FacetStatus) -> Self {
        Self {
            status,
            area: 0.0,
            perimeter: 0.0,
            diameter: 0.0,
            inradius: 0.0,
            centroid: None,
            incenter: None,
            offset_vertices: Vec::new(),
        }
    }

    /// Returns `true` if the facet stays open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status == FacetStatus::Open
    }
}

/// Maps facet pixels back to network coordinates.
struct PixelFrame {
    min: Point2,
    scale: f64,
    height: f64,
    unrotate: Option<Matrix3>,
}

impl PixelFrame {
    /// Converts a padded pixel coordinate `(row, col)` to a network point.
    fn to_network(&self, row: f64, col: f64) -> Point3 {
        let local = Point3::new(
            (row - 1.0) / self.scale + self.min.x,
            (col - 1.0) / self.scale + self.min.y,
            self.height,
        );
        match &self.unrotate {
            Some(r) => Point3::from(r * local.coords),
            None => local,
        }
    }
}

/// Measures the open cross-section of a throat facet eroded by fibres of
/// the given radius.
///
/// The facet is rotated into the xy-plane, scaled so its larger side spans
/// `resolution` pixels and rasterised. Pixels closer to the facet boundary
/// than the fibre radius are removed, and the remaining region is measured.
pub struct FacetCrossSection<'a> {
    vertices: &'a [Point3],
    normal: Vector3,
    fibre_radius: f64,
    resolution: usize,
    rotation: Option<Matrix3>,
}

impl<'a> FacetCrossSection<'a> {
    /// Creates a new `FacetCrossSection` operation.
    #[must_use]
    pub fn new(vertices: &'a [Point3], normal: Vector3, fibre_radius: f64) -> Self {
        Self {
            vertices,
            normal,
            fibre_radius,
            resolution: DEFAULT_FACET_RESOLUTION,
            rotation: None,
        }
    }

    /// Sets the pixel span of the larger facet side.
    #[must_use]
    pub fn with_resolution(mut self, resolution: usize) -> Self {
        self.resolution = resolution.max(1);
        self
    }

    /// Uses `rotation` to bring the facet into the xy-plane instead of the
    /// one derived from the normal.
    #[must_use]
    pub fn with_rotation(mut self, rotation: Matrix3) -> Self {
        self.rotation = Some(rotation);
        self
    }

    /// Executes the analysis.
    ///
    /// # Errors
    ///
    /// Returns `ImageError::MemoryExhausted` if a facet distance image cannot
    /// be allocated.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss,
        clippy::too_many_lines
    )]
    pub fn execute(&self) -> Result<FacetSection> {
        if self.vertices.len() < 3 || self.normal.norm() < TOLERANCE {
            debug!(vertices = self.vertices.len(), "degenerate facet");
            return Ok(FacetSection::closed(FacetStatus::Occluded));
        }

        let rotation = self
            .rotation
            .or_else(|| align_with(&self.normal, &Vector3::z()));
        let rotated = match &rotation {
            Some(r) => rotate_points(self.vertices, r),
            None => self.vertices.to_vec(),
        };

        let n = rotated.len() as f64;
        let height = rotated.iter().map(|p| p.z).sum::<f64>() / n;
        let min = Point2::new(
            rotated.iter().map(|p| p.x).fold(f64::INFINITY, f64::min),
            rotated.iter().map(|p| p.y).fold(f64::INFINITY, f64::min),
        );
        let span = rotated
            .iter()
            .map(|p| (p.x - min.x).max(p.y - min.y))
            .fold(0.0_f64, f64::max);
        if span < TOLERANCE {
            return Ok(FacetSection::closed(FacetStatus::Occluded));
        }

        let resolution = self.resolution as f64;
        let scale = resolution / span;
        let radius = self.fibre_radius * scale;
        if radius >= resolution / 2.0 {
            debug!(radius, "fibre radius exceeds half the facet span");
            return Ok(FacetSection::closed(FacetStatus::Occluded));
        }

        let frame = PixelFrame {
            min,
            scale,
            height,
            unrotate: rotation.map(|r| r.transpose()),
        };

        // one empty ring of padding on each side
        let size = self.resolution + 3;
        let shape = [size, size];
        let corners: Vec<[usize; 2]> = rotated
            .iter()
            .map(|p| {
                let row = ((p.x - min.x) * scale).round().clamp(0.0, resolution) as usize + 1;
                let col = ((p.y - min.y) * scale).round().clamp(0.0, resolution) as usize + 1;
                [row, col]
            })
            .collect();
        let mut outline = Grid2::new(shape, false);
        for &[i, j] in &corners {
            outline.set(i, j, true);
        }
        let hull = convex_hull_fill(&outline);

        let depth = distance_transform(&shape, |idx| !hull.data()[idx])?;
        let mut open = Grid2::new(shape, false);
        for (idx, &d) in depth.iter().enumerate() {
            if d > radius {
                let [i, j] = open.unravel(idx);
                open.set(i, j, true);
            }
        }
        let labels = match single_region(&open) {
            Ok(labels) => labels,
            Err(status) => return Ok(FacetSection::closed(status)),
        };
        let Some(props) = region_props(&labels.image, 1) else {
            return Ok(FacetSection::closed(FacetStatus::Occluded));
        };

        let inner = distance_transform(&shape, |idx| labels.image.data()[idx] != 1)?;
        let (deepest, inradius) = inner
            .iter()
            .copied()
            .enumerate()
            .fold((0, 0.0_f64), |best, (idx, d)| if d > best.1 { (idx, d) } else { best });

        let mut offset_pixels: Vec<[usize; 2]> = Vec::new();
        for corner in &corners {
            let nearest = props.boundary.iter().min_by_key(|b| {
                let di = b[0].abs_diff(corner[0]);
                let dj = b[1].abs_diff(corner[1]);
                di * di + dj * dj
            });
            if let Some(&pixel) = nearest {
                if !offset_pixels.contains(&pixel) {
                    offset_pixels.push(pixel);
                }
            }
        }
        if offset_pixels.len() < 3 {
            return Ok(FacetSection::closed(FacetStatus::Occluded));
        }

        let [ci, cj] = labels.image.unravel(deepest);
        Ok(FacetSection {
            status: FacetStatus::Open,
            area: props.area as f64 / (scale * scale),
            perimeter: props.perimeter / scale,
            diameter: props.equivalent_diameter / scale,
            inradius: inradius / scale,
            centroid: Some(frame.to_network(props.centroid.x, props.centroid.y)),
            incenter: Some(frame.to_network(ci as f64, cj as f64)),
            offset_vertices: offset_pixels
                .iter()
                .map(|&[i, j]| frame.to_network(i as f64, j as f64))
                .collect(),
        })
    }
}

/// Labels the open pixels of an eroded facet, or returns the status of a
/// facet that is not a single open region.
fn single_region(open: &Grid2<bool>) -> std::result::Result<Labels, FacetStatus> {
    if open.count() < 3 {
        return Err(FacetStatus::Occluded);
    }
    let labels = label_regions(open);
    match labels.count {
        0 => Err(FacetStatus::Occluded),
        1 => Ok(labels),
        regions => {
            warn!(regions, "eroded facet splits into several regions");
            Err(FacetStatus::MultiRegion)
        }
    }
}
