use std::f64::consts::{PI, SQRT_2};

use super::grid::Grid2;
use crate::math::polygon_2d::{convex_hull_order, point_in_convex_polygon};
use crate::math::Point2;

/// Shape measurements of one labelled region of a 2D image.
#[derive(Debug, Clone)]
pub struct RegionProps {
    /// Number of pixels.
    pub area: usize,
    /// Mean pixel coordinate `(row, col)`.
    pub centroid: Point2,
    /// Boundary length estimate (4-neighbourhood, weighted by local pattern).
    pub perimeter: f64,
    /// Diameter of the circle with the same area.
    pub equivalent_diameter: f64,
    /// Pixels with at least one 4-neighbour outside the region.
    pub boundary: Vec<[usize; 2]>,
}

/// Measures the region of `labels` carrying `label`.
///
/// Returns `None` when no pixel carries the label.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn region_props(labels: &Grid2<u32>, label: u32) -> Option<RegionProps> {
    let mask = labels.map(|&l| l == label);
    let [rows, cols] = mask.shape();

    let mut area = 0usize;
    let (mut sum_i, mut sum_j) = (0.0, 0.0);
    let mut boundary = Vec::new();
    let mut border = Grid2::new([rows, cols], false);

    for idx in 0..rows * cols {
        let [i, j] = mask.unravel(idx);
        if !*mask.get(i, j) {
            continue;
        }
        area += 1;
        sum_i += i as f64;
        sum_j += j as f64;
        if is_border_pixel(&mask, i, j) {
            boundary.push([i, j]);
            border.set(i, j, true);
        }
    }
    if area == 0 {
        return None;
    }

    let area_f = area as f64;
    Some(RegionProps {
        area,
        centroid: Point2::new(sum_i / area_f, sum_j / area_f),
        perimeter: weighted_perimeter(&border),
        equivalent_diameter: (4.0 * area_f / PI).sqrt(),
        boundary,
    })
}

/// A set pixel survives a cross-shaped erosion only if all four
/// 4-neighbours are set; pixels outside the image count as unset.
#[allow(clippy::cast_possible_wrap)]
fn is_border_pixel(mask: &Grid2<bool>, i: usize, j: usize) -> bool {
    let (i, j) = (i as i64, j as i64);
    [(-1, 0), (1, 0), (0, -1), (0, 1)]
        .iter()
        .any(|&(di, dj)| mask.get_checked(i + di, j + dj) != Some(&true))
}

/// Perimeter of a border image, weighting each border pixel by the pattern
/// of its neighbours.
///
/// Each pixel is scored with the kernel `[[10, 2, 10], [2, 1, 2], [10, 2, 10]]`;
/// straight runs weigh 1, diagonal steps √2 and corners (1 + √2) / 2.
#[allow(clippy::cast_possible_wrap)]
fn weighted_perimeter(border: &Grid2<bool>) -> f64 {
    const KERNEL: [[u32; 3]; 3] = [[10, 2, 10], [2, 1, 2], [10, 2, 10]];
    let [rows, cols] = border.shape();
    let mut total = 0.0;
    for i in 0..rows {
        for j in 0..cols {
            if !*border.get(i, j) {
                continue;
            }
            let mut code = 0u32;
            for (ki, row) in KERNEL.iter().enumerate() {
                for (kj, weight) in row.iter().enumerate() {
                    let ni = i as i64 + ki as i64 - 1;
                    let nj = j as i64 + kj as i64 - 1;
                    if border.get_checked(ni, nj) == Some(&true) {
                        code += weight;
                    }
                }
            }
            total += match code {
                5 | 7 | 15 | 17 | 25 | 27 => 1.0,
                21 | 33 => SQRT_2,
                13 | 23 => (1.0 + SQRT_2) / 2.0,
                _ => 0.0,
            };
        }
    }
    total
}

/// Fills the convex hull of the set pixels of a binary image.
///
/// Pixels whose centre lies inside or on the hull of the set pixel centres
/// are set. Images whose set pixels are collinear (or fewer than three) are
/// returned unchanged.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn convex_hull_fill(image: &Grid2<bool>) -> Grid2<bool> {
    let [rows, cols] = image.shape();
    let set: Vec<Point2> = (0..rows * cols)
        .filter(|&idx| image.data()[idx])
        .map(|idx| {
            let [i, j] = image.unravel(idx);
            Point2::new(i as f64, j as f64)
        })
        .collect();

    let Ok(order) = convex_hull_order(&set) else {
        return image.clone();
    };
    let hull: Vec<Point2> = order.into_iter().map(|i| set[i]).collect();

    let mut filled = image.clone();
    for i in 0..rows {
        for j in 0..cols {
            if point_in_convex_polygon(&Point2::new(i as f64, j as f64), &hull, 1e-9) {
                filled.set(i, j, true);
            }
        }
    }
    filled
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::image::label::label_regions;

    fn square_mask(size: usize, side: usize, offset: usize) -> Grid2<bool> {
        let mut g = Grid2::new([size, size], false);
        for i in offset..offset + side {
            for j in offset..offset + side {
                g.set(i, j, true);
            }
        }
        g
    }

    #[test]
    fn square_region_props() {
        let labels = label_regions(&square_mask(12, 4, 3));
        assert_eq!(labels.count, 1);
        let props = region_props(&labels.image, 1).unwrap();
        assert_eq!(props.area, 16);
        assert!((props.centroid.x - 4.5).abs() < 1e-12);
        assert!((props.centroid.y - 4.5).abs() < 1e-12);
        assert_eq!(props.boundary.len(), 12);
        let expected_d = (4.0 * 16.0 / PI).sqrt();
        assert!((props.equivalent_diameter - expected_d).abs() < 1e-12);
    }

    #[test]
    fn square_perimeter_is_close_to_edge_length() {
        let labels = label_regions(&square_mask(40, 20, 10));
        let props = region_props(&labels.image, 1).unwrap();
        // border pixels run along a 19 x 19 centre-line square
        assert!((props.perimeter - 76.0).abs() < 3.0, "perimeter {}", props.perimeter);
    }

    #[test]
    fn missing_label_has_no_props() {
        let labels = label_regions(&square_mask(5, 2, 1));
        assert!(region_props(&labels.image, 2).is_none());
    }

    #[test]
    fn hull_fill_of_square_corners() {
        let mut g = Grid2::new([8, 8], false);
        for &(i, j) in &[(1, 1), (1, 6), (6, 6), (6, 1)] {
            g.set(i, j, true);
        }
        let filled = convex_hull_fill(&g);
        assert_eq!(filled.count(), 36);
        assert!(!*filled.get(0, 0));
        assert!(*filled.get(3, 4));
    }

    #[test]
    fn hull_fill_of_line_is_unchanged() {
        let mut g = Grid2::new([4, 4], false);
        g.set(0, 0, true);
        g.set(3, 3, true);
        assert_eq!(convex_hull_fill(&g), g);
    }
}
