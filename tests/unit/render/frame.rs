use super::*;

#[test]
fn straight_conversion_undoes_premultiplication() {
    let f = FrameRGBA {
        width: 2,
        height: 1,
        data: vec![64, 32, 0, 128, 10, 20, 30, 255],
        premultiplied: true,
    };
    let s = f.to_straight_rgba8();
    assert_eq!(&s[4..], &[10, 20, 30, 255]);
    assert_eq!(s[3], 128);
    assert!((i32::from(s[0]) - 128).abs() <= 1);
    assert!((i32::from(s[1]) - 64).abs() <= 1);
}

#[test]
fn pixel_lookup_is_bounds_checked() {
    let f = FrameRGBA {
        width: 1,
        height: 1,
        data: vec![1, 2, 3, 4],
        premultiplied: false,
    };
    assert_eq!(f.pixel(0, 0), Some([1, 2, 3, 4]));
    assert_eq!(f.pixel(1, 0), None);
    assert_eq!(f.to_straight_rgba8(), f.data);
}
