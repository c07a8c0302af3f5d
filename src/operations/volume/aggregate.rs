use tracing::{debug, info, warn};

use crate::error::{Result, TopologyError};
use crate::image::Grid3;
use crate::math::{unique_points, Point3};
use crate::operations::fibre::FibreImage;
use crate::operations::hull::{ClassifyHull, DEFAULT_HULL_TOLERANCE};

/// Decimal places kept when deduplicating hull vertices in voxel units.
const HULL_DECIMALS: i32 = 6;

/// Void measurements of one pore hull.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoreVolume {
    /// Pore-space volume inside the hull.
    pub volume: f64,
    /// Diameter of the largest fibre-free sphere centred in the hull.
    pub indiameter: f64,
    /// Centre of that sphere, `None` when the hull holds no pore space.
    pub incenter: Option<Point3>,
    /// Open voxels inside the hull.
    pub pore_voxels: usize,
    /// Fibre voxels inside the hull.
    pub fibre_voxels: usize,
}

/// Result of [`HullVolume`]: one record per hull plus the label image.
#[derive(Debug, Clone)]
pub struct HullVolumes {
    /// Owning hull index per voxel, `-1` outside every hull.
    pub labels: Grid3<i32>,
    /// Measurements in hull order.
    pub pores: Vec<PoreVolume>,
    /// Voxels claimed by more than one hull.
    pub overwritten: usize,
}

/// Measures the pore space enclosed by each hull of a set of pores.
///
/// Hulls are given in network coordinates and classified in order; a voxel
/// inside several hulls belongs to the last one.
pub struct HullVolume<'a> {
    image: &'a FibreImage,
    hulls: &'a [Vec<Point3>],
    tolerance: f64,
}

impl<'a> HullVolume<'a> {
    /// Creates a new `HullVolume` operation.
    #[must_use]
    pub fn new(image: &'a FibreImage, hulls: &'a [Vec<Point3>]) -> Self {
        Self {
            image,
            hulls,
            tolerance: DEFAULT_HULL_TOLERANCE,
        }
    }

    /// Sets the tolerance of the hull half-space test, in voxel units.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Executes the measurement.
    ///
    /// # Errors
    ///
    /// Returns `ImageError::MemoryExhausted` if the label image cannot be
    /// allocated, or `TopologyError::InvalidTopology` if there are more hulls
    /// than labels.
    #[allow(clippy::cast_precision_loss, clippy::cast_sign_loss)]
    pub fn execute(&self) -> Result<HullVolumes> {
        let shape = self.image.shape();
        let mut labels = Grid3::try_new(shape, -1i32, "pore label image")?;
        info!(hulls = self.hulls.len(), "classifying pore hulls");

        let mut overwritten = 0;
        for (index, hull) in self.hulls.iter().enumerate() {
            let label = i32::try_from(index)
                .map_err(|_| TopologyError::InvalidTopology("too many pores to label".into()))?;
            let points: Vec<Point3> = hull
                .iter()
                .map(|p| self.image.to_voxel_units(p))
                .collect();
            let points = unique_points(&points, HULL_DECIMALS);
            match ClassifyHull::new(&points, shape)
                .with_tolerance(self.tolerance)
                .execute()
            {
                Ok(region) => overwritten += region.merge_into(&mut labels, label),
                Err(err) => warn!(pore = index, %err, "pore hull has no volume"),
            }
        }
        if overwritten > 0 {
            debug!(overwritten, "hulls overlap, later pores keep the shared voxels");
        }

        let mut pores = vec![PoreVolume::default(); self.hulls.len()];
        let mut deepest: Vec<Option<(usize, f64)>> = vec![None; self.hulls.len()];
        let fibre = self.image.fibre().data();
        let distance = self.image.distance().data();
        for (idx, &label) in labels.data().iter().enumerate() {
            if label < 0 {
                continue;
            }
            let l = label as usize;
            if fibre[idx] == 1 {
                pores[l].pore_voxels += 1;
                let d = distance[idx];
                if deepest[l].is_none_or(|(_, best)| d > best) {
                    deepest[l] = Some((idx, d));
                }
            } else {
                pores[l].fibre_voxels += 1;
            }
        }

        let length = self.image.voxel_length();
        for (pore, deep) in pores.iter_mut().zip(&deepest) {
            pore.volume = pore.pore_voxels as f64 * length.powi(3);
            if let Some((idx, d)) = *deep {
                pore.indiameter = 2.0 * d * length;
                pore.incenter = Some(self.image.voxel_center(labels.unravel(idx)));
            }
        }

        Ok(HullVolumes {
            labels,
            pores,
            overwritten,
        })
    }
}
