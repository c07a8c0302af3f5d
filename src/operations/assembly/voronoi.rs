use tracing::{debug, info};

use super::derived::{center_to_center, compactness, sphere_area, sphere_diameter};
use crate::config::GeometryConfig;
use crate::error::{GeometryError, Result};
use crate::image::{Grid2, Grid3};
use crate::math::polygon_3d::facet_normal;
use crate::math::{mean_point, Point3};
use crate::operations::diagnostics::{fibre_slice, porosity_profile, PorosityProfile, SliceSelector};
use crate::operations::facet::FacetCrossSection;
use crate::operations::fibre::{BuildFibreImage, FibreImage};
use crate::operations::volume::HullVolume;
use crate::properties::GeometryStore;
use crate::topology::{Network, PoreId, ThroatId};

/// Geometry of a Voronoi network whose edges are clad in fibres.
///
/// Built in one pass by [`VoronoiGeometry::build`]. The fibre and label images
/// are kept for inspection.
#[derive(Debug)]
pub struct VoronoiGeometry {
    store: GeometryStore,
    image: FibreImage,
    labels: Grid3<i32>,
    labelled_pores: Vec<PoreId>,
    trimmed: Vec<ThroatId>,
}

impl VoronoiGeometry {
    /// Computes pore and throat geometry for `network`.
    ///
    /// Throats left without open area by the fibres are removed from
    /// `network`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` for an unusable configuration,
    /// `TopologyError` if the network references missing entities,
    /// `GeometryError::Degenerate` if no internal pore has hull vertices, and
    /// `ImageError::MemoryExhausted` if the voxel images cannot be allocated.
    pub fn build(network: &mut Network, config: &GeometryConfig) -> Result<Self> {
        config.validate()?;
        info!(
            pores = network.num_pores(),
            throats = network.num_throats(),
            "building Voronoi fibre geometry"
        );

        let mut store = GeometryStore::new();
        for (id, _) in network.pores() {
            let vertices = network.pore_hull_points(id)?;
            let record = store.pore_mut(id);
            record.centroid = mean_point(&vertices);
            record.vertices = vertices;
        }

        let labelled_pores = network.internal_pores();
        let hulls = labelled_pores
            .iter()
            .map(|&id| network.pore_hull_points(id))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let throat_ids: Vec<ThroatId> = network.throats().map(|(id, _)| id).collect();
        let facets = throat_ids
            .iter()
            .map(|&id| network.throat_facet_points(id))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let bounds = bounding_box(hulls.iter().flatten()).ok_or_else(|| {
            GeometryError::Degenerate("no internal pore has hull vertices".into())
        })?;
        let image = BuildFibreImage::new(
            &facets,
            bounds,
            config.voxel_length,
            config.fibre_radius_voxels(),
        )
        .with_chunk_len(config.chunk_len)
        .with_max_voxels(config.max_voxels)
        .execute()?;

        let volumes = HullVolume::new(&image, &hulls)
            .with_tolerance(config.hull_tolerance)
            .execute()?;
        for (&id, measured) in labelled_pores.iter().zip(&volumes.pores) {
            let record = store.pore_mut(id);
            record.volume = measured.volume;
            record.indiameter = measured.indiameter;
            record.incenter = measured.incenter;
            record.pore_voxels = measured.pore_voxels;
            record.fibre_voxels = measured.fibre_voxels;
        }

        info!(throats = throat_ids.len(), "measuring throat cross-sections");
        let mut occluded = Vec::new();
        for (&id, vertices) in throat_ids.iter().zip(facets) {
            let normal = facet_normal(&vertices);
            let section = FacetCrossSection::new(&vertices, normal, config.fibre_radius)
                .with_resolution(config.facet_resolution)
                .execute()?;
            debug!(?id, status = ?section.status, area = section.area, "throat cross-section");
            if section.area <= 0.0 {
                occluded.push(id);
            }

            let record = store.throat_mut(id);
            record.centroid = section.centroid.or_else(|| mean_point(&vertices));
            record.vertices = vertices;
            record.normal = normal;
            record.status = section.status;
            record.incenter = section.incenter;
            record.offset_vertices = section.offset_vertices;
            record.area = section.area;
            record.perimeter = section.perimeter;
            record.diameter = section.diameter;
            record.indiameter = 2.0 * section.inradius;
        }

        let mut geometry = Self {
            store,
            image,
            labels: volumes.labels,
            labelled_pores,
            trimmed: Vec::new(),
        };
        geometry.derive_fields(network, config);

        let removed = network.trim_throats(&occluded);
        for &id in &occluded {
            geometry.store.remove_throat(id);
        }
        info!(removed, "trimmed occluded throats");
        geometry.trimmed = occluded;
        Ok(geometry)
    }

    fn derive_fields(&mut self, network: &Network, config: &GeometryConfig) {
        let derived = config.derived;
        let ids: Vec<PoreId> = network.pores().map(|(id, _)| id).collect();
        for id in ids {
            let record = self.store.pore_mut(id);
            let diameter = sphere_diameter(record.volume);
            if derived.pore_diameter {
                record.diameter = diameter;
            }
            if derived.pore_area {
                record.area = sphere_area(diameter);
            }
        }

        let length = 2.0 * config.fibre_radius;
        for (id, throat) in network.throats() {
            let [p1, p2] = throat.conns;
            let c1 = self.store.pore(p1).and_then(|p| p.centroid);
            let c2 = self.store.pore(p2).and_then(|p| p.centroid);
            let record = self.store.throat_mut(id);
            record.length = length;
            record.volume = 0.0;
            if derived.throat_shape_factor {
                record.shape_factor = compactness(record.perimeter, record.area);
            }
            if derived.throat_surface_area {
                record.surface_area = record.perimeter * length;
            }
            record.c2c = center_to_center(record.centroid, c1, c2);
        }
    }

    /// Per-element geometry.
    #[must_use]
    pub fn store(&self) -> &GeometryStore {
        &self.store
    }

    /// Consumes the geometry, keeping only the per-element records.
    #[must_use]
    pub fn into_store(self) -> GeometryStore {
        self.store
    }

    /// Fibre image of the network.
    #[must_use]
    pub fn fibre_image(&self) -> &FibreImage {
        &self.image
    }

    /// Pore label image; see [`Self::pore_at_label`].
    #[must_use]
    pub fn labels(&self) -> &Grid3<i32> {
        &self.labels
    }

    /// Pore owning voxels with the given label.
    #[must_use]
    pub fn pore_at_label(&self, label: i32) -> Option<PoreId> {
        usize::try_from(label)
            .ok()
            .and_then(|i| self.labelled_pores.get(i).copied())
    }

    /// Throats removed from the network because no open area remains.
    #[must_use]
    pub fn trimmed(&self) -> &[ThroatId] {
        &self.trimmed
    }

    /// One plane of the fibre image; see [`fibre_slice`].
    #[must_use]
    pub fn fibre_slice(&self, selector: SliceSelector) -> Option<Grid2<u8>> {
        fibre_slice(&self.image, selector)
    }

    /// Pore-space fraction per slice of the fibre image.
    #[must_use]
    pub fn porosity_profile(&self) -> PorosityProfile {
        porosity_profile(&self.image)
    }
}

/// Minimum and maximum corners of a point set.
fn bounding_box<'a>(points: impl Iterator<Item = &'a Point3>) -> Option<(Point3, Point3)> {
    points.fold(None, |acc, p| match acc {
        None => Some((*p, *p)),
        Some((lo, hi)) => Some((lo.inf(p), hi.sup(p))),
    })
}
