mod profile;
mod slice;

pub use profile::{porosity_profile, PorosityProfile};
pub use slice::{fibre_slice, SliceSelector};
