use super::pore::PoreId;
use super::vertex::VertexId;

slotmap::new_key_type! {
    /// Unique identifier for a throat in the network.
    pub struct ThroatId;
}

/// A throat: the Voronoi facet shared by two neighbouring pores.
#[derive(Debug, Clone)]
pub struct ThroatData {
    /// The two pores connected by the throat.
    pub conns: [PoreId; 2],
    /// Vertices of the shared facet, in no particular order.
    pub facet: Vec<VertexId>,
}

impl ThroatData {
    /// Creates a new throat between two pores.
    #[must_use]
    pub fn new(conns: [PoreId; 2], facet: Vec<VertexId>) -> Self {
        Self { conns, facet }
    }
}
