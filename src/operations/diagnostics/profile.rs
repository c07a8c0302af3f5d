use crate::operations::fibre::FibreImage;

/// Pore-space fraction of every slice of the fibre image, per axis.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PorosityProfile {
    /// Porosity of each slice normal to x.
    pub x: Vec<f64>,
    /// Porosity of each slice normal to y.
    pub y: Vec<f64>,
    /// Porosity of each slice normal to z.
    pub z: Vec<f64>,
}

impl PorosityProfile {
    /// Profile along `axis` (0, 1 or 2).
    #[must_use]
    pub fn along(&self, axis: usize) -> &[f64] {
        match axis {
            0 => &self.x,
            1 => &self.y,
            _ => &self.z,
        }
    }
}

/// Mean pore-space fraction of each axis-aligned slice of the fibre image.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn porosity_profile(image: &FibreImage) -> PorosityProfile {
    let [nx, ny, nz] = image.shape();
    let mut open = [vec![0usize; nx], vec![0usize; ny], vec![0usize; nz]];
    let fibre = image.fibre();
    for (idx, &v) in fibre.data().iter().enumerate() {
        if v == 1 {
            let [i, j, k] = fibre.unravel(idx);
            open[0][i] += 1;
            open[1][j] += 1;
            open[2][k] += 1;
        }
    }

    let fraction = |counts: &[usize], per_slice: usize| -> Vec<f64> {
        counts
            .iter()
            .map(|&c| if per_slice == 0 { 0.0 } else { c as f64 / per_slice as f64 })
            .collect()
    };
    PorosityProfile {
        x: fraction(&open[0], ny * nz),
        y: fraction(&open[1], nx * nz),
        z: fraction(&open[2], nx * ny),
    }
}
