use approx::assert_abs_diff_eq;
use ndarray::Array3;

use pulsecam_core::magnify::pyramid::{
    build_pyramid, level_shape, max_levels, pyr_down, pyr_up, pyramid_level, reconstruct,
    reflect_101,
};

fn constant(h: usize, w: usize, value: f32) -> Array3<f32> {
    Array3::from_elem((h, w, 3), value)
}

#[test]
fn test_level_shape_rounds_up() {
    assert_eq!(level_shape(40, 100, 0), (40, 100));
    assert_eq!(level_shape(40, 100, 3), (5, 13));
    assert_eq!(level_shape(25, 40, 3), (4, 5));
    assert_eq!(level_shape(1, 1, 5), (1, 1));
}

#[test]
fn test_max_levels_reaches_single_pixel() {
    assert_eq!(max_levels(1, 1), 0);
    assert_eq!(max_levels(8, 8), 3);
    assert_eq!(max_levels(9, 2), 4);
    assert_eq!(max_levels(40, 100), 7);
    assert_eq!(level_shape(40, 100, max_levels(40, 100)), (1, 1));
}

#[test]
fn test_pyr_down_shape_odd() {
    let src = constant(5, 7, 10.0);
    assert_eq!(pyr_down(&src).dim(), (3, 4, 3));
}

#[test]
fn test_pyr_down_preserves_constant() {
    let down = pyr_down(&constant(9, 12, 128.0));
    for &v in down.iter() {
        assert_abs_diff_eq!(v, 128.0, epsilon = 1e-3);
    }
}

#[test]
fn test_pyr_up_preserves_constant() {
    let up = pyr_up(&constant(3, 4, 77.0));
    assert_eq!(up.dim(), (6, 8, 3));
    for &v in up.iter() {
        assert_abs_diff_eq!(v, 77.0, epsilon = 1e-3);
    }
}

#[test]
fn test_pyr_up_single_pixel() {
    let up = pyr_up(&constant(1, 1, 5.0));
    assert_eq!(up.dim(), (2, 2, 3));
    for &v in up.iter() {
        assert_abs_diff_eq!(v, 5.0, epsilon = 1e-4);
    }
}

#[test]
fn test_build_pyramid_levels() {
    let src = Array3::from_shape_fn((16, 20, 3), |(r, c, ch)| (r + c + ch) as f32);
    let pyramid = build_pyramid(&src, 3);
    assert_eq!(pyramid.len(), 4);
    assert_eq!(pyramid[0], src);
    assert_eq!(pyramid[1].dim(), (8, 10, 3));
    assert_eq!(pyramid[3].dim(), (2, 3, 3));
    assert_eq!(pyramid_level(&src, 3), pyramid[3]);
}

#[test]
fn test_reconstruct_matches_original_size() {
    for &(h, w) in &[(40, 100), (25, 40), (7, 13), (1, 1), (240, 320)] {
        for depth in 0..=5 {
            let src = constant(h, w, 50.0);
            let level = pyramid_level(&src, depth);
            let out = reconstruct(&level, depth, w, h);
            assert_eq!(out.dim(), (h, w, 3), "size {}x{} depth {}", w, h, depth);
        }
    }
}

#[test]
fn test_reconstruct_replicates_when_undersized() {
    let level = Array3::from_shape_fn((2, 2, 3), |(r, c, _)| (r * 2 + c) as f32);
    // Depth 0 means no expansion; the 2x2 level is stretched by edge replication
    let out = reconstruct(&level, 0, 4, 3);
    assert_eq!(out.dim(), (3, 4, 3));
    assert_eq!(out[[0, 0, 0]], 0.0);
    assert_eq!(out[[0, 3, 0]], 1.0);
    assert_eq!(out[[2, 0, 0]], 2.0);
    assert_eq!(out[[2, 3, 1]], 3.0);
}

#[test]
fn test_reconstruct_constant_round_trip() {
    let src = constant(40, 100, 200.0);
    let level = pyramid_level(&src, 3);
    let out = reconstruct(&level, 3, 100, 40);
    for &v in out.iter() {
        assert_abs_diff_eq!(v, 200.0, epsilon = 1e-2);
    }
}

#[test]
fn test_reflect_101() {
    assert_eq!(reflect_101(0, 5), 0);
    assert_eq!(reflect_101(4, 5), 4);
    assert_eq!(reflect_101(-1, 5), 1);
    assert_eq!(reflect_101(-2, 5), 2);
    assert_eq!(reflect_101(5, 5), 3);
    assert_eq!(reflect_101(6, 5), 2);
    assert_eq!(reflect_101(-3, 1), 0);
}
