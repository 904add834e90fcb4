use std::f32::consts::{FRAC_PI_2, PI};

use super::*;

fn ring_mask() -> MaskBuffer {
    // 5x5 with an opaque 3x3 center.
    let mut px = vec![0u8; 25];
    for y in 1..4 {
        for x in 1..4 {
            px[y * 5 + x] = 255;
        }
    }
    MaskBuffer::from_luma(5, 5, px).unwrap()
}

#[test]
fn border_cells_are_blocked() {
    let mask = MaskBuffer::from_luma(4, 4, vec![255; 16]).unwrap();
    let p = MaskBoundary::new();
    assert!(p.is_blocked(&mask, 0.0, 2.0));
    assert!(p.is_blocked(&mask, 2.0, 0.0));
    assert!(p.is_blocked(&mask, 4.0, 2.0));
    assert!(p.is_blocked(&mask, 2.0, 4.0));
    assert!(p.is_blocked(&mask, -1.0, 2.0));
    assert!(p.is_blocked(&mask, f32::NAN, 2.0));
    assert!(!p.is_blocked(&mask, 0.01, 0.01));
    assert!(!p.is_blocked(&mask, 3.99, 3.99));
}

#[test]
fn background_cells_are_blocked() {
    let mask = ring_mask();
    let p = MaskBoundary::new();
    assert!(!p.is_blocked(&mask, 2.5, 2.5));
    assert!(!p.is_blocked(&mask, 1.0, 1.0));
    assert!(p.is_blocked(&mask, 0.5, 2.5));
    assert!(p.is_blocked(&mask, 4.2, 2.5));
}

#[test]
fn partial_intensity_is_not_blocked() {
    let mask = MaskBuffer::from_luma(3, 3, vec![1; 9]).unwrap();
    assert!(!MaskBoundary::new().is_blocked(&mask, 1.5, 1.5));
}

#[test]
fn reflect_without_jitter_is_exact_half_turn() {
    let p = MaskBoundary::new();
    assert!((p.reflect(0.0, 0.9) - PI).abs() < 1e-6);
    assert!((p.reflect(FRAC_PI_2, 0.3) - 1.5 * PI).abs() < 1e-6);
    // 1.5π + π wraps to 0.5π
    assert!((p.reflect(1.5 * PI, 0.0) - FRAC_PI_2).abs() < 1e-5);
}

#[test]
fn reflect_with_jitter_stays_within_band() {
    let p = MaskBoundary::with_jitter(0.25);
    let h = p.reflect(0.0, 1.0 - f32::EPSILON);
    assert!(h >= PI && h <= 1.25 * PI + 1e-5);
    assert_eq!(MaskBoundary::with_jitter(-1.0).jitter, 0.0);
}
