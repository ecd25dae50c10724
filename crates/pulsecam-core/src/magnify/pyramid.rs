//! Gaussian pyramid decomposition and reconstruction of RGB images.
//!
//! Each reduction step low-passes with the separable binomial kernel and
//! keeps every other row and column; each expansion step inserts zeros and
//! low-passes with the same kernel scaled by 4. Borders reflect without
//! repeating the edge sample (`dcb|abcd|cba`).

use ndarray::Array3;

use crate::consts::PYRAMID_KERNEL;

/// Build a Gaussian pyramid with `levels` downsampled levels.
///
/// Returns a vector of `levels + 1` arrays, where index 0 is the original
/// and index `levels` is the coarsest.
pub fn build_pyramid(data: &Array3<f32>, levels: usize) -> Vec<Array3<f32>> {
    let mut pyramid = Vec::with_capacity(levels + 1);
    pyramid.push(data.clone());

    for _ in 0..levels {
        let next = pyr_down(&pyramid[pyramid.len() - 1]);
        pyramid.push(next);
    }

    pyramid
}

/// Only the coarsest level of [`build_pyramid`], without keeping the
/// intermediate levels around.
pub fn pyramid_level(data: &Array3<f32>, levels: usize) -> Array3<f32> {
    let mut current = data.clone();
    for _ in 0..levels {
        current = pyr_down(&current);
    }
    current
}

/// Spatial shape (height, width) of the pyramid level `levels` for an image of
/// the given size.
pub fn level_shape(height: usize, width: usize, levels: usize) -> (usize, usize) {
    (0..levels).fold((height, width), |(h, w), _| ((h + 1) / 2, (w + 1) / 2))
}

/// Deepest useful pyramid for an image of the given size: the number of
/// reductions after which the level is 1x1.
pub fn max_levels(height: usize, width: usize) -> usize {
    let (mut h, mut w) = (height, width);
    let mut levels = 0;
    while h > 1 || w > 1 {
        h = (h + 1) / 2;
        w = (w + 1) / 2;
        levels += 1;
    }
    levels
}

/// Blur and decimate by 2 in each dimension.
pub fn pyr_down(src: &Array3<f32>) -> Array3<f32> {
    let (h, w, channels) = src.dim();
    let out_h = (h + 1) / 2;
    let out_w = (w + 1) / 2;

    // Horizontal pass, evaluated only at the kept columns
    let mut rows = Array3::<f32>::zeros((h, out_w, channels));
    for row in 0..h {
        for out_col in 0..out_w {
            let center = (out_col * 2) as isize;
            for ch in 0..channels {
                let mut sum = 0.0f32;
                for (ki, &kv) in PYRAMID_KERNEL.iter().enumerate() {
                    let src_col = reflect_101(center + ki as isize - 2, w);
                    sum += src[[row, src_col, ch]] * kv;
                }
                rows[[row, out_col, ch]] = sum;
            }
        }
    }

    // Vertical pass at the kept rows
    let mut result = Array3::<f32>::zeros((out_h, out_w, channels));
    for out_row in 0..out_h {
        let center = (out_row * 2) as isize;
        for col in 0..out_w {
            for ch in 0..channels {
                let mut sum = 0.0f32;
                for (ki, &kv) in PYRAMID_KERNEL.iter().enumerate() {
                    let src_row = reflect_101(center + ki as isize - 2, h);
                    sum += rows[[src_row, col, ch]] * kv;
                }
                result[[out_row, col, ch]] = sum;
            }
        }
    }

    result
}

/// Upsample by 2 in each dimension: zero insertion followed by the pyramid
/// kernel scaled to preserve brightness.
pub fn pyr_up(src: &Array3<f32>) -> Array3<f32> {
    let (h, w, channels) = src.dim();
    let up_h = h * 2;
    let up_w = w * 2;

    // Horizontal pass: only even positions of the zero-stuffed row are non-zero
    let mut rows = Array3::<f32>::zeros((h, up_w, channels));
    for row in 0..h {
        for col in 0..up_w {
            for ch in 0..channels {
                let mut sum = 0.0f32;
                for (ki, &kv) in PYRAMID_KERNEL.iter().enumerate() {
                    let up_col = reflect_101(col as isize + ki as isize - 2, up_w);
                    if up_col % 2 == 0 {
                        sum += src[[row, up_col / 2, ch]] * kv * 2.0;
                    }
                }
                rows[[row, col, ch]] = sum;
            }
        }
    }

    let mut result = Array3::<f32>::zeros((up_h, up_w, channels));
    for row in 0..up_h {
        for col in 0..up_w {
            for ch in 0..channels {
                let mut sum = 0.0f32;
                for (ki, &kv) in PYRAMID_KERNEL.iter().enumerate() {
                    let up_row = reflect_101(row as isize + ki as isize - 2, up_h);
                    if up_row % 2 == 0 {
                        sum += rows[[up_row / 2, col, ch]] * kv * 2.0;
                    }
                }
                result[[row, col, ch]] = sum;
            }
        }
    }

    result
}

/// Expand a pyramid level `depth` times and crop to exactly
/// `(height, width)`, anchored at the top-left corner.
///
/// Expansion by powers of two overshoots odd sizes; the excess rows and
/// columns on the bottom/right are dropped. Should the expanded image come
/// out smaller than requested, the last row/column is replicated.
pub fn reconstruct(level: &Array3<f32>, depth: usize, width: usize, height: usize) -> Array3<f32> {
    let mut expanded = level.clone();
    for _ in 0..depth {
        expanded = pyr_up(&expanded);
    }

    let (up_h, up_w, channels) = expanded.dim();
    if up_h == 0 || up_w == 0 {
        return Array3::zeros((height, width, channels));
    }

    Array3::from_shape_fn((height, width, channels), |(row, col, ch)| {
        expanded[[row.min(up_h - 1), col.min(up_w - 1), ch]]
    })
}

/// Reflect an index into [0, size) without repeating the edge sample.
pub fn reflect_101(idx: isize, size: usize) -> usize {
    if size <= 1 {
        return 0;
    }
    let period = 2 * (size as isize - 1);
    let m = idx.rem_euclid(period);
    if m < size as isize {
        m as usize
    } else {
        (period - m) as usize
    }
}
