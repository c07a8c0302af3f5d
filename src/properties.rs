use slotmap::SecondaryMap;

use crate::math::{Point3, Vector3};
use crate::operations::facet::FacetStatus;
use crate::topology::{PoreId, ThroatId};

/// Geometry derived for one pore.
#[derive(Debug, Clone, Default)]
pub struct PoreGeometry {
    /// Voronoi vertices of the pore hull.
    pub vertices: Vec<Point3>,
    /// Mean of the hull vertices, `None` when the hull has no vertices.
    pub centroid: Option<Point3>,
    /// Void volume inside the hull (pore-space voxels × voxel volume).
    pub volume: f64,
    /// Diameter of the largest sphere inscribed in the fibre-free hull.
    pub indiameter: f64,
    /// Centre of that sphere.
    pub incenter: Option<Point3>,
    /// Equivalent sphere diameter of the volume.
    pub diameter: f64,
    /// Cross-sectional area of the equivalent sphere.
    pub area: f64,
    /// Hull voxels in pore space.
    pub pore_voxels: usize,
    /// Hull voxels occupied by fibre.
    pub fibre_voxels: usize,
}

/// Geometry derived for one throat.
#[derive(Debug, Clone, Default)]
pub struct ThroatGeometry {
    /// Voronoi vertices of the facet.
    pub vertices: Vec<Point3>,
    /// Facet normal (not normalized).
    pub normal: Vector3,
    /// Centroid of the eroded cross-section, or the mean facet vertex when
    /// no open area remains.
    pub centroid: Option<Point3>,
    /// Centre of the largest circle inscribed in the eroded cross-section.
    pub incenter: Option<Point3>,
    /// Vertices of the cross-section after fibre erosion.
    pub offset_vertices: Vec<Point3>,
    /// Eroded cross-section area.
    pub area: f64,
    /// Eroded cross-section perimeter.
    pub perimeter: f64,
    /// Equivalent circle diameter of the eroded cross-section.
    pub diameter: f64,
    /// Diameter of the largest inscribed circle.
    pub indiameter: f64,
    /// Compactness `perimeter² / area`.
    pub shape_factor: f64,
    /// Lateral area of the throat extruded along its length.
    pub surface_area: f64,
    /// Throat length, twice the fibre radius.
    pub length: f64,
    /// Throat volume; throats carry no volume in the fibre model.
    pub volume: f64,
    /// Pore centroid to throat centroid to pore centroid distance.
    pub c2c: f64,
    /// Outcome of the fibre erosion of the facet.
    pub status: FacetStatus,
}

impl ThroatGeometry {
    /// Returns `true` if the fibres close the throat.
    #[must_use]
    pub fn is_occluded(&self) -> bool {
        self.status == FacetStatus::Occluded
    }
}

/// Per-element geometry written by a pipeline pass, keyed by network IDs.
#[derive(Debug, Default)]
pub struct GeometryStore {
    pores: SecondaryMap<PoreId, PoreGeometry>,
    throats: SecondaryMap<ThroatId, ThroatGeometry>,
}

impl GeometryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Geometry of a pore, if computed.
    #[must_use]
    pub fn pore(&self, id: PoreId) -> Option<&PoreGeometry> {
        self.pores.get(id)
    }

    /// Mutable geometry of a pore, inserting a default record if absent.
    pub fn pore_mut(&mut self, id: PoreId) -> &mut PoreGeometry {
        if !self.pores.contains_key(id) {
            self.pores.insert(id, PoreGeometry::default());
        }
        &mut self.pores[id]
    }

    /// Geometry of a throat, if computed.
    #[must_use]
    pub fn throat(&self, id: ThroatId) -> Option<&ThroatGeometry> {
        self.throats.get(id)
    }

    /// Mutable geometry of a throat, inserting a default record if absent.
    pub fn throat_mut(&mut self, id: ThroatId) -> &mut ThroatGeometry {
        if !self.throats.contains_key(id) {
            self.throats.insert(id, ThroatGeometry::default());
        }
        &mut self.throats[id]
    }

    /// Drops the record of a throat trimmed from the network.
    pub fn remove_throat(&mut self, id: ThroatId) -> Option<ThroatGeometry> {
        self.throats.remove(id)
    }

    /// Iterates over all pore records.
    pub fn pores(&self) -> impl Iterator<Item = (PoreId, &PoreGeometry)> {
        self.pores.iter()
    }

    /// Iterates over all throat records.
    pub fn throats(&self) -> impl Iterator<Item = (ThroatId, &ThroatGeometry)> {
        self.throats.iter()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::topology::{Network, PoreData, ThroatData};

    #[test]
    fn records_are_created_on_first_write() {
        let mut net = Network::new();
        let a = net.add_pore(PoreData::new(Point3::origin(), vec![]));
        let b = net.add_pore(PoreData::new(Point3::new(1.0, 0.0, 0.0), vec![]));
        let t = net.add_throat(ThroatData::new([a, b], vec![])).unwrap();

        let mut store = GeometryStore::new();
        assert!(store.pore(a).is_none());
        store.pore_mut(a).volume = 2.0;
        store.throat_mut(t).area = 1.5;
        assert!((store.pore(a).unwrap().volume - 2.0).abs() < f64::EPSILON);
        assert!(store.pore(b).is_none());

        assert!(store.remove_throat(t).is_some());
        assert!(store.throat(t).is_none());
    }
}
