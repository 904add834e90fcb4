use std::sync::Arc;

use super::*;

#[test]
fn from_luma_validates_shape() {
    assert!(MaskBuffer::from_luma(0, 2, vec![]).is_err());
    assert!(MaskBuffer::from_luma(2, 2, vec![0; 3]).is_err());
    let m = MaskBuffer::from_luma(2, 2, vec![0, 1, 2, 3]).unwrap();
    assert_eq!(m.get(1, 0), Some(1));
    assert_eq!(m.get(0, 1), Some(2));
    assert_eq!(m.get(2, 0), None);
    assert_eq!(m.intensity(5, 5), 0);
}

#[test]
fn from_image_keeps_first_channel() {
    let img = DecodedImage {
        width: 2,
        height: 1,
        rgba8: Arc::new(vec![255, 0, 0, 255, 7, 200, 200, 255]),
    };
    let m = MaskBuffer::from_image(&img, 1.0).unwrap();
    assert_eq!(m.as_slice(), &[255, 7]);
    assert_eq!((m.width(), m.height()), (2, 1));
}

#[test]
fn from_image_applies_decode_scale() {
    let img = DecodedImage {
        width: 8,
        height: 4,
        rgba8: Arc::new([255u8, 255, 255, 255].repeat(32)),
    };
    let m = MaskBuffer::from_image(&img, 0.25).unwrap();
    assert_eq!((m.width(), m.height()), (2, 1));
    assert!(m.as_slice().iter().all(|&v| v == 255));
}
