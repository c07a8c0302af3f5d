mod cross_section;

pub use cross_section::{FacetCrossSection, FacetSection, FacetStatus, DEFAULT_FACET_RESOLUTION};
