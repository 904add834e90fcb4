use super::*;

#[test]
fn default_palette_has_two_entries() {
    let p = Palette::default();
    assert_eq!(p.len(), 2);
    assert_eq!(p.color(0), [255, 255, 255]);
    assert_eq!(p.color(1), [247, 203, 105]);
    assert_eq!(p.color(2), [255, 255, 255]);
}

#[test]
fn palette_rejects_empty_and_oversized() {
    assert!(Palette::new(Vec::new()).is_err());
    assert!(Palette::new(vec![[0, 0, 0]; 257]).is_err());
    assert!(Palette::new(vec![[0, 0, 0]; 256]).is_ok());
}

#[test]
fn palette_serializes_as_plain_list() {
    let p = Palette::new(vec![[1, 2, 3]]).unwrap();
    let json = serde_json::to_string(&p).unwrap();
    assert_eq!(json, "[[1,2,3]]");
    let back: Palette = serde_json::from_str(&json).unwrap();
    assert_eq!(back, p);
}
