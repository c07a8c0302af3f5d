pub mod config;
pub mod error;
pub mod image;
pub mod math;
pub mod operations;
pub mod properties;
pub mod topology;

pub use config::{DerivedFields, GeometryConfig};
pub use error::{PorenetError, Result};
pub use operations::assembly::VoronoiGeometry;
