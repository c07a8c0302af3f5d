mod derived;
mod voronoi;

pub use derived::{center_to_center, compactness, sphere_area, sphere_diameter};
pub use voronoi::VoronoiGeometry;
