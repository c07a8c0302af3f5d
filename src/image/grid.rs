use crate::error::ImageError;

/// Allocates a vector of `len` copies of `fill`, reporting allocation
/// failure instead of aborting.
///
/// # Errors
///
/// Returns `ImageError::MemoryExhausted` if the allocation fails.
pub fn try_filled<T: Clone>(len: usize, fill: T, what: &'static str) -> Result<Vec<T>, ImageError> {
    let mut data = Vec::new();
    data.try_reserve_exact(len)
        .map_err(|_| ImageError::MemoryExhausted { what, voxels: len })?;
    data.resize(len, fill);
    Ok(data)
}

/// Dense 3D voxel grid stored in x-major (C) order.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid3<T> {
    shape: [usize; 3],
    data: Vec<T>,
}

impl<T: Clone> Grid3<T> {
    /// Creates a grid of the given shape with every voxel set to `fill`.
    ///
    /// # Errors
    ///
    /// Returns `ImageError::MemoryExhausted` if the voxels cannot be allocated.
    pub fn try_new(shape: [usize; 3], fill: T, what: &'static str) -> Result<Self, ImageError> {
        let data = try_filled(shape[0] * shape[1] * shape[2], fill, what)?;
        Ok(Self { shape, data })
    }
}

impl<T> Grid3<T> {
    /// Grid dimensions `[nx, ny, nz]`.
    #[must_use]
    pub fn shape(&self) -> [usize; 3] {
        self.shape
    }

    /// Total number of voxels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the grid holds no voxels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Flat index of voxel `(i, j, k)`.
    #[must_use]
    pub fn index(&self, i: usize, j: usize, k: usize) -> usize {
        (i * self.shape[1] + j) * self.shape[2] + k
    }

    /// Voxel coordinates of a flat index.
    #[must_use]
    pub fn unravel(&self, index: usize) -> [usize; 3] {
        let k = index % self.shape[2];
        let j = (index / self.shape[2]) % self.shape[1];
        let i = index / (self.shape[1] * self.shape[2]);
        [i, j, k]
    }

    /// Converts signed voxel coordinates to a flat index, or `None` when the
    /// voxel lies outside the grid.
    #[must_use]
    pub fn checked_index(&self, ijk: [i64; 3]) -> Option<usize> {
        let mut idx = [0usize; 3];
        for axis in 0..3 {
            let c = usize::try_from(ijk[axis]).ok()?;
            if c >= self.shape[axis] {
                return None;
            }
            idx[axis] = c;
        }
        Some(self.index(idx[0], idx[1], idx[2]))
    }

    /// Returns the voxel at `(i, j, k)`.
    #[must_use]
    pub fn get(&self, i: usize, j: usize, k: usize) -> &T {
        &self.data[self.index(i, j, k)]
    }

    /// Sets the voxel at `(i, j, k)`.
    pub fn set(&mut self, i: usize, j: usize, k: usize, value: T) {
        let idx = self.index(i, j, k);
        self.data[idx] = value;
    }

    /// Flat view of the voxel data.
    #[must_use]
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Mutable flat view of the voxel data.
    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }
}

/// Dense 2D image stored in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid2<T> {
    shape: [usize; 2],
    data: Vec<T>,
}

impl<T: Clone> Grid2<T> {
    /// Creates an image of the given shape with every pixel set to `fill`.
    #[must_use]
    pub fn new(shape: [usize; 2], fill: T) -> Self {
        Self {
            shape,
            data: vec![fill; shape[0] * shape[1]],
        }
    }

    /// Maps every pixel through `f`.
    #[must_use]
    pub fn map<U>(&self, f: impl Fn(&T) -> U) -> Grid2<U> {
        Grid2 {
            shape: self.shape,
            data: self.data.iter().map(f).collect(),
        }
    }
}

impl<T> Grid2<T> {
    /// Image dimensions `[rows, cols]`.
    #[must_use]
    pub fn shape(&self) -> [usize; 2] {
        self.shape
    }

    /// Flat index of pixel `(i, j)`.
    #[must_use]
    pub fn index(&self, i: usize, j: usize) -> usize {
        i * self.shape[1] + j
    }

    /// Pixel coordinates of a flat index.
    #[must_use]
    pub fn unravel(&self, index: usize) -> [usize; 2] {
        [index / self.shape[1], index % self.shape[1]]
    }

    /// Returns the pixel at `(i, j)`.
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> &T {
        &self.data[self.index(i, j)]
    }

    /// Returns the pixel at signed coordinates, or `None` outside the image.
    #[must_use]
    pub fn get_checked(&self, i: i64, j: i64) -> Option<&T> {
        let i = usize::try_from(i).ok()?;
        let j = usize::try_from(j).ok()?;
        if i >= self.shape[0] || j >= self.shape[1] {
            return None;
        }
        Some(self.get(i, j))
    }

    /// Sets the pixel at `(i, j)`.
    pub fn set(&mut self, i: usize, j: usize, value: T) {
        let idx = self.index(i, j);
        self.data[idx] = value;
    }

    /// Flat view of the pixel data.
    #[must_use]
    pub fn data(&self) -> &[T] {
        &self.data
    }
}

impl Grid2<bool> {
    /// Number of set pixels.
    #[must_use]
    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&v| v).count()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn index_round_trips_through_unravel() {
        let g = Grid3::try_new([3, 4, 5], 0u8, "test").unwrap();
        let idx = g.index(2, 1, 3);
        assert_eq!(g.unravel(idx), [2, 1, 3]);
    }

    #[test]
    fn checked_index_rejects_outside() {
        let g = Grid3::try_new([2, 2, 2], 0u8, "test").unwrap();
        assert!(g.checked_index([-1, 0, 0]).is_none());
        assert!(g.checked_index([0, 2, 0]).is_none());
        assert_eq!(g.checked_index([1, 1, 1]), Some(7));
    }

    #[test]
    fn grid2_checked_access() {
        let mut g = Grid2::new([2, 3], false);
        g.set(1, 2, true);
        assert_eq!(g.get_checked(1, 2), Some(&true));
        assert!(g.get_checked(2, 0).is_none());
        assert!(g.get_checked(0, -1).is_none());
        assert_eq!(g.count(), 1);
    }
}
