use thiserror::Error;

/// Top-level error type for the pore network geometry pipeline.
#[derive(Debug, Error)]
pub enum PorenetError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Image(#[from] ImageError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors related to geometric computations.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("degenerate geometry: {0}")]
    Degenerate(String),
}

/// Errors related to the network topology consumed by the pipeline.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("entity not found: {0}")]
    EntityNotFound(String),

    #[error("invalid topology: {0}")]
    InvalidTopology(String),
}

/// Errors raised while building voxel images.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("cannot allocate {voxels} voxels for {what}")]
    MemoryExhausted { what: &'static str, voxels: usize },
}

/// Errors related to pipeline configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {parameter} = {value} ({reason})")]
    Invalid {
        parameter: &'static str,
        value: f64,
        reason: &'static str,
    },
}

/// Convenience type alias for results using [`PorenetError`].
pub type Result<T> = std::result::Result<T, PorenetError>;
