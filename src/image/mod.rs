pub mod edt;
pub mod grid;
pub mod label;
pub mod region;

pub use edt::{distance_transform, squared_distance_transform};
pub use grid::{Grid2, Grid3};
pub use label::{label_regions, Labels};
pub use region::{convex_hull_fill, region_props, RegionProps};
