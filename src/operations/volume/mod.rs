mod aggregate;

pub use aggregate::{HullVolume, HullVolumes, PoreVolume};
