pub mod assembly;
pub mod diagnostics;
pub mod facet;
pub mod fibre;
pub mod hull;
pub mod volume;
