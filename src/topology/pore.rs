use super::vertex::VertexId;
use crate::math::Point3;

slotmap::new_key_type! {
    /// Unique identifier for a pore in the network.
    pub struct PoreId;
}

/// A pore: one Delaunay seed point and the Voronoi cell around it.
#[derive(Debug, Clone)]
pub struct PoreData {
    /// Seed coordinates of the pore.
    pub coords: Point3,
    /// Vertices of the Voronoi cell enclosing the pore.
    pub hull: Vec<VertexId>,
    /// `false` for pores that only close the domain boundary. Only internal
    /// pores are voxelised.
    pub internal: bool,
}

impl PoreData {
    /// Creates an internal pore.
    #[must_use]
    pub fn new(coords: Point3, hull: Vec<VertexId>) -> Self {
        Self {
            coords,
            hull,
            internal: true,
        }
    }

    /// Creates a boundary pore, excluded from voxelisation.
    #[must_use]
    pub fn boundary(coords: Point3, hull: Vec<VertexId>) -> Self {
        Self {
            coords,
            hull,
            internal: false,
        }
    }
}
