use tracing::{debug, info, warn};

use super::lines::facet_edge_points;
use crate::error::{ImageError, Result};
use crate::image::{distance_transform, Grid3};
use crate::math::{Point3, Vector3};

/// Offset, in voxel units, applied before flooring a coordinate so that
/// points on a voxel face land in the upper voxel despite rounding noise.
const VOXEL_EPSILON: f64 = 1e-9;

/// Halo width, in fibre radii, around each chunk.
const HALO_RADII: usize = 5;

/// Voxel image of the fibre skeleton laid along the Voronoi edges.
#[derive(Debug, Clone)]
pub struct FibreImage {
    origin: Point3,
    voxel_length: f64,
    fibre_radius: usize,
    fibre: Grid3<u8>,
    distance: Grid3<f64>,
    chunks: [usize; 3],
    dropped_points: usize,
}

impl FibreImage {
    /// Network coordinates of the minimum corner of voxel `(0, 0, 0)`.
    #[must_use]
    pub fn origin(&self) -> Point3 {
        self.origin
    }

    /// Voxel edge length in network units.
    #[must_use]
    pub fn voxel_length(&self) -> f64 {
        self.voxel_length
    }

    /// Fibre radius in voxels.
    #[must_use]
    pub fn fibre_radius(&self) -> usize {
        self.fibre_radius
    }

    /// Grid dimensions in voxels.
    #[must_use]
    pub fn shape(&self) -> [usize; 3] {
        self.fibre.shape()
    }

    /// Binary image: 1 for pore space, 0 for fibre.
    #[must_use]
    pub fn fibre(&self) -> &Grid3<u8> {
        &self.fibre
    }

    /// Distance from each voxel to the fibre surface, in voxels. Zero inside
    /// the fibre.
    #[must_use]
    pub fn distance(&self) -> &Grid3<f64> {
        &self.distance
    }

    /// Chunks used per axis; `[1, 1, 1]` when the grid was processed whole.
    #[must_use]
    pub fn chunks(&self) -> [usize; 3] {
        self.chunks
    }

    /// Whether the image was processed piecewise.
    #[must_use]
    pub fn is_chunked(&self) -> bool {
        self.chunks != [1, 1, 1]
    }

    /// Number of edge samples that fell outside the grid.
    #[must_use]
    pub fn dropped_points(&self) -> usize {
        self.dropped_points
    }

    /// Converts a network point to voxel units relative to the origin.
    #[must_use]
    pub fn to_voxel_units(&self, point: &Point3) -> Point3 {
        Point3::from((point - self.origin) / self.voxel_length)
    }

    /// Network coordinates of the centre of voxel `(i, j, k)`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn voxel_center(&self, [i, j, k]: [usize; 3]) -> Point3 {
        let offset = Vector3::new(i as f64 + 0.5, j as f64 + 0.5, k as f64 + 0.5);
        self.origin + offset * self.voxel_length
    }

    /// Fraction of voxels in pore space.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn porosity(&self) -> f64 {
        if self.fibre.is_empty() {
            return 0.0;
        }
        let open = self.fibre.data().iter().filter(|&&v| v == 1).count();
        open as f64 / self.fibre.len() as f64
    }
}

/// Number of voxels needed along each axis to cover `[min, max]`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn grid_shape(min: &Point3, max: &Point3, voxel_length: f64) -> [usize; 3] {
    let mut shape = [1usize; 3];
    for (axis, n) in shape.iter_mut().enumerate() {
        let span = ((max[axis] - min[axis]) / voxel_length).max(0.0);
        *n = (span + VOXEL_EPSILON).floor() as usize + 1;
    }
    shape
}

/// Number of chunks per axis for a given chunk edge length.
#[must_use]
pub fn chunk_counts(shape: [usize; 3], chunk_len: usize) -> [usize; 3] {
    shape.map(|l| if l > chunk_len { l.div_ceil(chunk_len) } else { 1 })
}

/// Builds the fibre image from the facet polygons of a network.
///
/// Edge samples are cleared in an all-pore-space seed grid, then every voxel
/// within `fibre_radius` voxels of a seed becomes fibre.
pub struct BuildFibreImage<'a> {
    facets: &'a [Vec<Point3>],
    min_corner: Point3,
    max_corner: Point3,
    voxel_length: f64,
    fibre_radius: usize,
    chunk_len: usize,
    max_voxels: Option<usize>,
}

impl<'a> BuildFibreImage<'a> {
    /// Creates a new `BuildFibreImage` operation over the box
    /// `[min_corner, max_corner]`.
    #[must_use]
    pub fn new(
        facets: &'a [Vec<Point3>],
        (min_corner, max_corner): (Point3, Point3),
        voxel_length: f64,
        fibre_radius: usize,
    ) -> Self {
        Self {
            facets,
            min_corner,
            max_corner,
            voxel_length,
            fibre_radius,
            chunk_len: 100,
            max_voxels: None,
        }
    }

    /// Sets the chunk edge length, in voxels.
    #[must_use]
    pub fn with_chunk_len(mut self, chunk_len: usize) -> Self {
        self.chunk_len = chunk_len.max(1);
        self
    }

    /// Sets the voxel budget above which the grid is processed in chunks.
    #[must_use]
    pub fn with_max_voxels(mut self, max_voxels: Option<usize>) -> Self {
        self.max_voxels = max_voxels;
        self
    }

    /// Executes the rasterisation.
    ///
    /// # Errors
    ///
    /// Returns `ImageError::MemoryExhausted` if the seed or output grids
    /// cannot be allocated, or if a chunk's distance transform cannot be.
    pub fn execute(&self) -> Result<FibreImage> {
        let shape = grid_shape(&self.min_corner, &self.max_corner, self.voxel_length);
        info!(?shape, fibre_radius = self.fibre_radius, "building fibre image");

        let (seeds, dropped_points) = self.seed_grid(shape)?;
        let mut fibre = Grid3::try_new(shape, 1u8, "fibre image")?;
        let mut distance = Grid3::try_new(shape, 0.0f64, "fibre distance image")?;

        let voxels = seeds.len();
        let mut chunks = [1, 1, 1];
        let mut chunked = self.max_voxels.is_some_and(|budget| voxels > budget);
        if chunked {
            info!(voxels, "voxel budget exceeded, processing in chunks");
        } else if let Err(err) =
            self.process_window(&seeds, &mut fibre, &mut distance, [0; 3], shape)
        {
            info!(%err, "full distance transform does not fit, processing in chunks");
            chunked = true;
        }

        if chunked {
            chunks = chunk_counts(shape, self.chunk_len);
            self.process_chunks(&seeds, &mut fibre, &mut distance, chunks)?;
        }

        Ok(FibreImage {
            origin: self.min_corner,
            voxel_length: self.voxel_length,
            fibre_radius: self.fibre_radius,
            fibre,
            distance,
            chunks,
            dropped_points,
        })
    }

    /// Seed grid with edge samples cleared to 0, plus the number of samples
    /// that fell outside it.
    #[allow(clippy::cast_possible_truncation)]
    fn seed_grid(&self, shape: [usize; 3]) -> Result<(Grid3<u8>, usize)> {
        let mut seeds = Grid3::try_new(shape, 1u8, "fibre seed image")?;
        let samples = facet_edge_points(self.facets, 0.5 * self.voxel_length);
        debug!(samples = samples.len(), "sampled facet edges");

        let mut dropped = 0;
        for sample in &samples {
            let rel = (sample - self.min_corner) / self.voxel_length;
            let ijk = [rel.x, rel.y, rel.z].map(|c| (c + VOXEL_EPSILON).floor() as i64);
            match seeds.checked_index(ijk) {
                Some(idx) => seeds.data_mut()[idx] = 0,
                None => dropped += 1,
            }
        }
        if dropped > 0 {
            warn!(dropped, "fibre edge samples outside the image were dropped");
        }
        Ok((seeds, dropped))
    }

    fn process_chunks(
        &self,
        seeds: &Grid3<u8>,
        fibre: &mut Grid3<u8>,
        distance: &mut Grid3<f64>,
        chunks: [usize; 3],
    ) -> Result<()> {
        let shape = seeds.shape();
        let core = |axis: usize, c: usize| {
            (c * self.chunk_len, ((c + 1) * self.chunk_len).min(shape[axis]))
        };
        for ci in 0..chunks[0] {
            for cj in 0..chunks[1] {
                for ck in 0..chunks[2] {
                    let (x0, x1) = core(0, ci);
                    let (y0, y1) = core(1, cj);
                    let (z0, z1) = core(2, ck);
                    debug!(chunk = ?[ci, cj, ck], "processing fibre chunk");
                    self.process_window(seeds, fibre, distance, [x0, y0, z0], [x1, y1, z1])?;
                }
            }
        }
        Ok(())
    }

    /// Classifies the core box `[lo, hi)` using a distance transform over the
    /// core widened by the halo and clamped to the grid.
    #[allow(clippy::cast_precision_loss)]
    fn process_window(
        &self,
        seeds: &Grid3<u8>,
        fibre: &mut Grid3<u8>,
        distance: &mut Grid3<f64>,
        lo: [usize; 3],
        hi: [usize; 3],
    ) -> std::result::Result<(), ImageError> {
        let shape = seeds.shape();
        let halo = HALO_RADII * self.fibre_radius;
        let win_lo: [usize; 3] = std::array::from_fn(|a| lo[a].saturating_sub(halo));
        let win_hi: [usize; 3] = std::array::from_fn(|a| (hi[a] + halo).min(shape[a]));
        let size: [usize; 3] = std::array::from_fn(|a| win_hi[a] - win_lo[a]);

        let local = |i: usize, j: usize, k: usize| (i * size[1] + j) * size[2] + k;
        let dt = distance_transform(&size, |idx| {
            let k = idx % size[2];
            let j = (idx / size[2]) % size[1];
            let i = idx / (size[1] * size[2]);
            *seeds.get(win_lo[0] + i, win_lo[1] + j, win_lo[2] + k) == 0
        })?;

        let diagonal = size.iter().map(|&n| (n * n) as f64).sum::<f64>().sqrt();
        let radius = self.fibre_radius as f64;
        for i in lo[0]..hi[0] {
            for j in lo[1]..hi[1] {
                for k in lo[2]..hi[2] {
                    let d = dt[local(i - win_lo[0], j - win_lo[1], k - win_lo[2])];
                    let d = if d.is_finite() { d } else { diagonal };
                    fibre.set(i, j, k, u8::from(d > radius));
                    distance.set(i, j, k, (d - radius).max(0.0));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn square(z: f64, lo: f64, hi: f64) -> Vec<Point3> {
        vec![p(lo, lo, z), p(hi, lo, z), p(hi, hi, z), p(lo, hi, z)]
    }

    fn facets() -> Vec<Vec<Point3>> {
        vec![
            square(4.0, 2.0, 20.0),
            square(15.0, 3.0, 18.0),
            vec![p(2.0, 2.0, 2.0), p(20.0, 5.0, 2.0), p(10.0, 20.0, 21.0)],
        ]
    }

    #[test]
    fn grid_shape_covers_the_box() {
        assert_eq!(grid_shape(&p(0.0, 0.0, 0.0), &p(10.0, 9.5, 0.0), 1.0), [11, 10, 1]);
        assert_eq!(grid_shape(&p(0.0, 0.0, 0.0), &p(3e-6, 1e-6, 2e-6), 1e-6), [4, 2, 3]);
    }

    #[test]
    fn chunk_counts_round_up() {
        assert_eq!(chunk_counts([250, 100, 99], 100), [3, 1, 1]);
        assert_eq!(chunk_counts([7, 7, 7], 3), [3, 3, 3]);
    }

    #[test]
    fn fibre_surrounds_the_edges() {
        let facets = vec![square(5.0, 2.0, 12.0)];
        let img = BuildFibreImage::new(&facets, (p(0.0, 0.0, 0.0), p(14.0, 14.0, 10.0)), 1.0, 1)
            .execute()
            .unwrap();
        assert_eq!(img.shape(), [15, 15, 11]);
        assert_eq!(img.dropped_points(), 0);
        // on an edge
        assert_eq!(*img.fibre().get(2, 7, 5), 0);
        // one voxel off the edge is still inside the fibre
        assert_eq!(*img.fibre().get(2, 7, 6), 0);
        // facet interior is open
        assert_eq!(*img.fibre().get(7, 7, 5), 1);
        assert!(*img.distance().get(7, 7, 5) > 3.0);
        assert!(img.porosity() > 0.5 && img.porosity() < 1.0);
    }

    #[test]
    fn zero_radius_keeps_only_seed_voxels() {
        let facets = vec![square(2.0, 1.0, 5.0)];
        let img = BuildFibreImage::new(&facets, (p(0.0, 0.0, 0.0), p(6.0, 6.0, 4.0)), 1.0, 0)
            .execute()
            .unwrap();
        assert_eq!(*img.fibre().get(1, 3, 2), 0);
        assert_eq!(*img.fibre().get(1, 3, 3), 1);
        assert_eq!(*img.fibre().get(3, 3, 2), 1);
    }

    #[test]
    fn samples_outside_the_box_are_dropped() {
        let facets = vec![square(2.0, -4.0, 4.0)];
        let img = BuildFibreImage::new(&facets, (p(0.0, 0.0, 0.0), p(6.0, 6.0, 4.0)), 1.0, 1)
            .execute()
            .unwrap();
        assert!(img.dropped_points() > 0);
    }

    #[test]
    fn chunked_image_matches_the_whole_image() {
        let facets = facets();
        let bounds = (p(0.0, 0.0, 0.0), p(22.0, 22.0, 22.0));
        let whole = BuildFibreImage::new(&facets, bounds, 1.0, 2).execute().unwrap();
        let chunked = BuildFibreImage::new(&facets, bounds, 1.0, 2)
            .with_chunk_len(6)
            .with_max_voxels(Some(1000))
            .execute()
            .unwrap();
        assert!(!whole.is_chunked());
        assert_eq!(chunked.chunks(), [4, 4, 4]);
        assert_eq!(whole.fibre(), chunked.fibre());
    }

    #[test]
    fn empty_window_is_capped_at_its_diagonal() {
        let facets: Vec<Vec<Point3>> = Vec::new();
        let img = BuildFibreImage::new(&facets, (p(0.0, 0.0, 0.0), p(2.0, 3.0, 5.0)), 1.0, 0)
            .execute()
            .unwrap();
        let diag = (9.0f64 + 16.0 + 36.0).sqrt();
        assert!(img.fibre().data().iter().all(|&v| v == 1));
        assert!((img.distance().get(0, 0, 0) - diag).abs() < 1e-12);
    }

    #[test]
    fn voxel_centres_are_half_a_voxel_in() {
        let facets: Vec<Vec<Point3>> = Vec::new();
        let img = BuildFibreImage::new(&facets, (p(1.0, 1.0, 1.0), p(3.0, 3.0, 3.0)), 0.5, 0)
            .execute()
            .unwrap();
        let c = img.voxel_center([0, 1, 2]);
        assert!((c - p(1.25, 1.75, 2.25)).norm() < 1e-12);
        assert!((img.to_voxel_units(&c) - p(0.5, 1.5, 2.5)).norm() < 1e-12);
    }
}
