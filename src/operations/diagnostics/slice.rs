use tracing::warn;

use crate::image::Grid2;
use crate::operations::fibre::FibreImage;

/// Selects an axis-aligned plane of the fibre image.
///
/// Exactly one component must be non-zero; its axis is the slicing axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SliceSelector {
    /// Position as a fraction of the image length along the axis.
    Fraction([f64; 3]),
    /// Voxel index along the axis.
    Index([usize; 3]),
}

impl SliceSelector {
    /// Slicing axis and voxel index, or `None` if the selector does not name
    /// a single axis.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    fn resolve(self, shape: [usize; 3]) -> Option<(usize, usize)> {
        match self {
            SliceSelector::Fraction(f) => {
                let axis = single_axis(f.map(|c| c != 0.0))?;
                let index = (f[axis] * shape[axis] as f64).round().max(0.0) as usize;
                Some((axis, index.min(shape[axis].saturating_sub(1))))
            }
            SliceSelector::Index(i) => {
                let axis = single_axis(i.map(|c| c != 0))?;
                Some((axis, i[axis]))
            }
        }
    }
}

fn single_axis(non_zero: [bool; 3]) -> Option<usize> {
    let mut axes = (0..3).filter(|&a| non_zero[a]);
    let axis = axes.next()?;
    axes.next().is_none().then_some(axis)
}

/// Extracts one plane of the binary fibre image.
///
/// The slice keeps the two remaining axes in ascending order. Returns `None`
/// and logs a warning when the selector does not name a single axis or the
/// index lies outside the image.
#[must_use]
pub fn fibre_slice(image: &FibreImage, selector: SliceSelector) -> Option<Grid2<u8>> {
    let shape = image.shape();
    let Some((axis, index)) = selector.resolve(shape) else {
        warn!(?selector, "slice selector must have exactly two zero components");
        return None;
    };
    if index >= shape[axis] {
        warn!(index, axis, "slice index outside the fibre image");
        return None;
    }

    let (a, b) = match axis {
        0 => (1, 2),
        1 => (0, 2),
        _ => (0, 1),
    };
    let fibre = image.fibre();
    let mut slice = Grid2::new([shape[a], shape[b]], 0u8);
    for u in 0..shape[a] {
        for v in 0..shape[b] {
            let mut ijk = [0usize; 3];
            ijk[axis] = index;
            ijk[a] = u;
            ijk[b] = v;
            slice.set(u, v, *fibre.get(ijk[0], ijk[1], ijk[2]));
        }
    }
    Some(slice)
}
