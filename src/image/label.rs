use std::collections::VecDeque;

use super::grid::Grid2;

/// Connected regions of a binary image.
#[derive(Debug, Clone)]
pub struct Labels {
    /// Per-pixel region label; `0` is background, regions start at `1`.
    pub image: Grid2<u32>,
    /// Number of regions found.
    pub count: u32,
}

/// Labels the 8-connected regions of a binary image.
#[must_use]
pub fn label_regions(mask: &Grid2<bool>) -> Labels {
    let [rows, cols] = mask.shape();
    let mut image = Grid2::new([rows, cols], 0u32);
    let mut count = 0u32;
    let mut queue = VecDeque::new();

    for start in 0..rows * cols {
        let [si, sj] = mask.unravel(start);
        if !*mask.get(si, sj) || *image.get(si, sj) != 0 {
            continue;
        }
        count += 1;
        image.set(si, sj, count);
        queue.push_back((si, sj));

        while let Some((i, j)) = queue.pop_front() {
            for di in -1i64..=1 {
                for dj in -1i64..=1 {
                    if di == 0 && dj == 0 {
                        continue;
                    }
                    #[allow(clippy::cast_possible_wrap)]
                    let (ni, nj) = (i as i64 + di, j as i64 + dj);
                    if mask.get_checked(ni, nj) != Some(&true) {
                        continue;
                    }
                    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
                    let (ni, nj) = (ni as usize, nj as usize);
                    if *image.get(ni, nj) == 0 {
                        image.set(ni, nj, count);
                        queue.push_back((ni, nj));
                    }
                }
            }
        }
    }

    Labels { image, count }
}
