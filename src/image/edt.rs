//! Exact Euclidean distance transform.
//!
//! Separable lower-envelope-of-parabolas algorithm (Felzenszwalb and
//! Huttenlocher), applied one axis at a time to a flat C-ordered array of any
//! dimension. Distances are measured in voxel units between voxel centres.

use super::grid::try_filled;
use crate::error::ImageError;

/// Squared distance from every element to the nearest feature element.
///
/// Elements with no feature anywhere in the array get `f64::INFINITY`.
///
/// # Errors
///
/// Returns `ImageError::MemoryExhausted` if the distance buffer cannot be
/// allocated.
pub fn squared_distance_transform(
    shape: &[usize],
    is_feature: impl Fn(usize) -> bool,
) -> Result<Vec<f64>, ImageError> {
    let len: usize = shape.iter().product();
    let mut dist = try_filled(len, f64::INFINITY, "distance transform")?;
    for (i, d) in dist.iter_mut().enumerate() {
        if is_feature(i) {
            *d = 0.0;
        }
    }
    if len == 0 {
        return Ok(dist);
    }

    let max_n = shape.iter().copied().max().unwrap_or(0);
    let mut line = vec![0.0; max_n];
    let mut out = vec![0.0; max_n];
    let mut vertices = vec![0usize; max_n];
    let mut bounds = vec![0.0; max_n + 1];

    for axis in 0..shape.len() {
        let n = shape[axis];
        let stride: usize = shape[axis + 1..].iter().product();
        let block = n * stride;
        for outer in 0..len / block {
            for inner in 0..stride {
                let start = outer * block + inner;
                for q in 0..n {
                    line[q] = dist[start + q * stride];
                }
                transform_line(&line[..n], &mut out[..n], &mut vertices, &mut bounds);
                for q in 0..n {
                    dist[start + q * stride] = out[q];
                }
            }
        }
    }
    Ok(dist)
}

/// Euclidean distance from every element to the nearest feature element.
///
/// # Errors
///
/// Returns `ImageError::MemoryExhausted` if the distance buffer cannot be
/// allocated.
pub fn distance_transform(
    shape: &[usize],
    is_feature: impl Fn(usize) -> bool,
) -> Result<Vec<f64>, ImageError> {
    let mut dist = squared_distance_transform(shape, is_feature)?;
    for d in &mut dist {
        *d = d.sqrt();
    }
    Ok(dist)
}

/// One-dimensional squared distance transform of a sampled function.
///
/// Infinite samples do not contribute a parabola.
#[allow(clippy::cast_precision_loss)]
fn transform_line(f: &[f64], out: &mut [f64], v: &mut [usize], z: &mut [f64]) {
    let n = f.len();
    let Some(first) = f.iter().position(|x| x.is_finite()) else {
        out.fill(f64::INFINITY);
        return;
    };

    let mut k = 0usize;
    v[0] = first;
    z[0] = f64::NEG_INFINITY;
    z[1] = f64::INFINITY;

    for q in first + 1..n {
        if !f[q].is_finite() {
            continue;
        }
        let qf = q as f64;
        let mut s;
        loop {
            let pf = v[k] as f64;
            s = ((f[q] + qf * qf) - (f[v[k]] + pf * pf)) / (2.0 * (qf - pf));
            // z[0] is -inf, so k never drops below zero
            if s > z[k] {
                break;
            }
            k -= 1;
        }
        k += 1;
        v[k] = q;
        z[k] = s;
        z[k + 1] = f64::INFINITY;
    }

    k = 0;
    for (q, o) in out.iter_mut().enumerate() {
        let qf = q as f64;
        while z[k + 1] < qf {
            k += 1;
        }
        let d = qf - v[k] as f64;
        *o = d * d + f[v[k]];
    }
}
