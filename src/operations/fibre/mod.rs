mod image;
mod lines;

pub use image::{chunk_counts, grid_shape, BuildFibreImage, FibreImage};
pub use lines::facet_edge_points;
