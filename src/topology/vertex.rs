use crate::math::Point3;

slotmap::new_key_type! {
    /// Unique identifier for a Voronoi vertex in the network.
    pub struct VertexId;
}

/// A Voronoi vertex shared by the hulls and facets that touch it.
#[derive(Debug, Clone)]
pub struct VertexData {
    /// The 3D position of the vertex.
    pub point: Point3,
}

impl VertexData {
    /// Creates a new vertex at the given point.
    #[must_use]
    pub fn new(point: Point3) -> Self {
        Self { point }
    }
}
