use crate::error::{ConfigError, Result};

/// Parameters of a Voronoi fibre geometry pass.
#[derive(Debug, Clone, Copy)]
pub struct GeometryConfig {
    /// Radius of the fibres laid along Voronoi edges, in network length units.
    pub fibre_radius: f64,
    /// Edge length of one voxel of the fibre image, in network length units.
    pub voxel_length: f64,
    /// Pixel span of the larger side of a throat facet image.
    pub facet_resolution: usize,
    /// Tolerance of the hull half-space test, in voxel units.
    pub hull_tolerance: f64,
    /// Edge length, in voxels, of the cubic chunks used when the fibre image
    /// is processed piecewise.
    pub chunk_len: usize,
    /// Voxel budget above which the fibre image is always processed in
    /// chunks. `None` only chunks when allocation fails.
    pub max_voxels: Option<usize>,
    /// Which derived fields to compute after the image analysis.
    pub derived: DerivedFields,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            fibre_radius: 3e-6,
            voxel_length: 1e-6,
            facet_resolution: 200,
            hull_tolerance: 1e-7,
            chunk_len: 100,
            max_voxels: None,
            derived: DerivedFields::default(),
        }
    }
}

impl GeometryConfig {
    /// Sets the fibre radius.
    #[must_use]
    pub fn with_fibre_radius(mut self, fibre_radius: f64) -> Self {
        self.fibre_radius = fibre_radius;
        self
    }

    /// Sets the voxel edge length.
    #[must_use]
    pub fn with_voxel_length(mut self, voxel_length: f64) -> Self {
        self.voxel_length = voxel_length;
        self
    }

    /// Sets the facet image resolution.
    #[must_use]
    pub fn with_facet_resolution(mut self, facet_resolution: usize) -> Self {
        self.facet_resolution = facet_resolution;
        self
    }

    /// Sets the chunk edge length.
    #[must_use]
    pub fn with_chunk_len(mut self, chunk_len: usize) -> Self {
        self.chunk_len = chunk_len;
        self
    }

    /// Sets the voxel budget that forces chunked processing.
    #[must_use]
    pub fn with_max_voxels(mut self, max_voxels: usize) -> Self {
        self.max_voxels = Some(max_voxels);
        self
    }

    /// Sets the derived fields to compute.
    #[must_use]
    pub fn with_derived(mut self, derived: DerivedFields) -> Self {
        self.derived = derived;
        self
    }

    /// Fibre radius expressed in whole voxels.
    ///
    /// A fibre thinner than half a voxel rounds to zero. Half-way values
    /// round to the even neighbour.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn fibre_radius_voxels(&self) -> usize {
        let r = ((self.fibre_radius - self.voxel_length / 2.0) / self.voxel_length)
            .round_ties_even();
        if r > 0.0 {
            r as usize
        } else {
            0
        }
    }

    /// Checks that every parameter is usable.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` naming the first offending parameter.
    pub fn validate(&self) -> Result<()> {
        if !(self.voxel_length.is_finite() && self.voxel_length > 0.0) {
            return Err(ConfigError::Invalid {
                parameter: "voxel_length",
                value: self.voxel_length,
                reason: "must be positive",
            }
            .into());
        }
        if !(self.fibre_radius.is_finite() && self.fibre_radius >= 0.0) {
            return Err(ConfigError::Invalid {
                parameter: "fibre_radius",
                value: self.fibre_radius,
                reason: "must be non-negative",
            }
            .into());
        }
        if self.facet_resolution == 0 {
            return Err(ConfigError::Invalid {
                parameter: "facet_resolution",
                value: 0.0,
                reason: "must be at least one pixel",
            }
            .into());
        }
        if self.chunk_len == 0 {
            return Err(ConfigError::Invalid {
                parameter: "chunk_len",
                value: 0.0,
                reason: "must be at least one voxel",
            }
            .into());
        }
        if !(self.hull_tolerance.is_finite() && self.hull_tolerance >= 0.0) {
            return Err(ConfigError::Invalid {
                parameter: "hull_tolerance",
                value: self.hull_tolerance,
                reason: "must be non-negative",
            }
            .into());
        }
        Ok(())
    }
}

/// Derived per-element fields computed from the image analysis results.
#[derive(Debug, Clone, Copy)]
#[allow(clippy::struct_excessive_bools)]
pub struct DerivedFields {
    /// `pore.diameter` as the diameter of the sphere with the pore volume.
    pub pore_diameter: bool,
    /// `pore.area` as the cross-section of that sphere.
    pub pore_area: bool,
    /// `throat.shape_factor` as the compactness `P² / A`.
    pub throat_shape_factor: bool,
    /// `throat.surface_area` as the perimeter extruded along the throat length.
    pub throat_surface_area: bool,
}

impl Default for DerivedFields {
    fn default() -> Self {
        Self {
            pore_diameter: true,
            pore_area: true,
            throat_shape_factor: true,
            throat_surface_area: true,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(GeometryConfig::default().validate().is_ok());
    }

    #[test]
    fn fibre_radius_in_voxels_rounds_half_to_even() {
        let cfg = GeometryConfig::default()
            .with_voxel_length(1.0)
            .with_fibre_radius(3.0);
        // (3 - 0.5) / 1 = 2.5
        assert_eq!(cfg.fibre_radius_voxels(), 2);
        // (4 - 0.5) / 1 = 3.5
        assert_eq!(cfg.with_fibre_radius(4.0).fibre_radius_voxels(), 4);
        assert_eq!(cfg.with_fibre_radius(3.2).fibre_radius_voxels(), 3);
    }

    #[test]
    fn thin_fibre_rounds_to_zero_voxels() {
        let cfg = GeometryConfig::default().with_fibre_radius(0.0);
        assert_eq!(cfg.fibre_radius_voxels(), 0);
    }

    #[test]
    fn rejects_bad_parameters() {
        let cfg = GeometryConfig::default();
        assert!(cfg.with_voxel_length(0.0).validate().is_err());
        assert!(cfg.with_fibre_radius(-1.0).validate().is_err());
        assert!(cfg.with_facet_resolution(0).validate().is_err());
        assert!(cfg.with_chunk_len(0).validate().is_err());
    }
}
