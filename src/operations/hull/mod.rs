mod classify;

pub use classify::{ClassifyHull, HullRegion, DEFAULT_HULL_TOLERANCE};
