pub mod pore;
pub mod throat;
pub mod vertex;

pub use pore::{PoreData, PoreId};
pub use throat::{ThroatData, ThroatId};
pub use vertex::{VertexData, VertexId};

use crate::error::TopologyError;
use crate::math::Point3;
use slotmap::SlotMap;

/// Arena holding the pore network topology read by the geometry pipeline.
///
/// Pores and throats reference Voronoi vertices via typed IDs, so a vertex
/// shared by several hulls and facets is stored once.
#[derive(Debug, Default)]
pub struct Network {
    vertices: SlotMap<VertexId, VertexData>,
    pores: SlotMap<PoreId, PoreData>,
    throats: SlotMap<ThroatId, ThroatData>,
}

impl Network {
    /// Creates a new, empty network.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Vertex operations ---

    /// Inserts a vertex and returns its ID.
    pub fn add_vertex(&mut self, data: VertexData) -> VertexId {
        self.vertices.insert(data)
    }

    /// Returns a reference to the vertex data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the network.
    pub fn vertex(&self, id: VertexId) -> Result<&VertexData, TopologyError> {
        self.vertices
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("vertex".into()))
    }

    // --- Pore operations ---

    /// Inserts a pore and returns its ID.
    pub fn add_pore(&mut self, data: PoreData) -> PoreId {
        self.pores.insert(data)
    }

    /// Returns a reference to the pore data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the network.
    pub fn pore(&self, id: PoreId) -> Result<&PoreData, TopologyError> {
        self.pores
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("pore".into()))
    }

    /// Iterates over all pores in slot order.
    pub fn pores(&self) -> impl Iterator<Item = (PoreId, &PoreData)> {
        self.pores.iter()
    }

    /// Number of pores.
    #[must_use]
    pub fn num_pores(&self) -> usize {
        self.pores.len()
    }

    /// IDs of the internal pores, in slot order.
    #[must_use]
    pub fn internal_pores(&self) -> Vec<PoreId> {
        self.pores
            .iter()
            .filter(|(_, p)| p.internal)
            .map(|(id, _)| id)
            .collect()
    }

    /// Coordinates of the Voronoi vertices around a pore.
    ///
    /// # Errors
    ///
    /// Returns an error if the pore or one of its vertices is missing.
    pub fn pore_hull_points(&self, id: PoreId) -> Result<Vec<Point3>, TopologyError> {
        self.points(&self.pore(id)?.hull)
    }

    // --- Throat operations ---

    /// Inserts a throat and returns its ID.
    ///
    /// # Errors
    ///
    /// Returns an error if either pore is missing or the throat would connect
    /// a pore to itself.
    pub fn add_throat(&mut self, data: ThroatData) -> Result<ThroatId, TopologyError> {
        let [p1, p2] = data.conns;
        self.pore(p1)?;
        self.pore(p2)?;
        if p1 == p2 {
            return Err(TopologyError::InvalidTopology(
                "throat connects a pore to itself".into(),
            ));
        }
        Ok(self.throats.insert(data))
    }

    /// Returns a reference to the throat data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the network.
    pub fn throat(&self, id: ThroatId) -> Result<&ThroatData, TopologyError> {
        self.throats
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("throat".into()))
    }

    /// Iterates over all throats in slot order.
    pub fn throats(&self) -> impl Iterator<Item = (ThroatId, &ThroatData)> {
        self.throats.iter()
    }

    /// Number of throats.
    #[must_use]
    pub fn num_throats(&self) -> usize {
        self.throats.len()
    }

    /// Coordinates of the vertices of a throat facet.
    ///
    /// # Errors
    ///
    /// Returns an error if the throat or one of its vertices is missing.
    pub fn throat_facet_points(&self, id: ThroatId) -> Result<Vec<Point3>, TopologyError> {
        self.points(&self.throat(id)?.facet)
    }

    /// Removes throats from the active topology.
    ///
    /// Unknown IDs are ignored. Returns the number of throats removed.
    pub fn trim_throats(&mut self, ids: &[ThroatId]) -> usize {
        ids.iter()
            .filter(|&&id| self.throats.remove(id).is_some())
            .count()
    }

    fn points(&self, ids: &[VertexId]) -> Result<Vec<Point3>, TopologyError> {
        ids.iter().map(|&v| Ok(self.vertex(v)?.point)).collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn hull_points_follow_vertex_ids() {
        let mut net = Network::new();
        let a = net.add_vertex(VertexData::new(p(0.0, 0.0, 0.0)));
        let b = net.add_vertex(VertexData::new(p(1.0, 0.0, 0.0)));
        let pore = net.add_pore(PoreData::new(p(0.5, 0.5, 0.5), vec![b, a]));
        let pts = net.pore_hull_points(pore).unwrap();
        assert_eq!(pts, vec![p(1.0, 0.0, 0.0), p(0.0, 0.0, 0.0)]);
    }

    #[test]
    fn self_loop_throat_is_rejected() {
        let mut net = Network::new();
        let pore = net.add_pore(PoreData::new(p(0.0, 0.0, 0.0), vec![]));
        assert!(net.add_throat(ThroatData::new([pore, pore], vec![])).is_err());
    }

    #[test]
    fn boundary_pores_are_not_internal() {
        let mut net = Network::new();
        let inner = net.add_pore(PoreData::new(p(0.0, 0.0, 0.0), vec![]));
        net.add_pore(PoreData::boundary(p(1.0, 0.0, 0.0), vec![]));
        assert_eq!(net.internal_pores(), vec![inner]);
    }

    #[test]
    fn trimming_removes_throats_once() {
        let mut net = Network::new();
        let a = net.add_pore(PoreData::new(p(0.0, 0.0, 0.0), vec![]));
        let b = net.add_pore(PoreData::new(p(1.0, 0.0, 0.0), vec![]));
        let t = net.add_throat(ThroatData::new([a, b], vec![])).unwrap();
        assert_eq!(net.trim_throats(&[t, t]), 1);
        assert_eq!(net.num_throats(), 0);
        assert!(net.throat(t).is_err());
    }
}
