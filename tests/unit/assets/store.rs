use super::*;

#[test]
fn normalize_path_slash_normalization() {
    assert_eq!(normalize_rel_path("a/b.png").unwrap(), "a/b.png");
    assert_eq!(normalize_rel_path("a\\b.png").unwrap(), "a/b.png");
    assert_eq!(normalize_rel_path("./a//b.png").unwrap(), "a/b.png");
    assert!(normalize_rel_path("../x.png").is_err());
    assert!(normalize_rel_path("/abs.png").is_err());
    assert!(normalize_rel_path("").is_err());
    assert!(normalize_rel_path("./.").is_err());
}

#[test]
fn asset_id_is_stable_across_separators() {
    let store = AssetStore::new(".");
    let a = store.id_for("masks/m1.png").unwrap();
    let b = store.id_for("masks\\m1.png").unwrap();
    assert_eq!(a, b);
    assert_eq!(a, AssetStore::hash_id_for_path("masks/m1.png"));
    assert_ne!(a, store.id_for("masks/m2.png").unwrap());
}

#[test]
fn inserted_images_are_served_without_io() {
    let mut store = AssetStore::new("/nonexistent-root");
    let img = DecodedImage {
        width: 2,
        height: 1,
        rgba8: Arc::new(vec![255; 8]),
    };
    let id = store.insert_image("mask.png", img).unwrap();
    let got = store.load_image("./mask.png").unwrap();
    assert_eq!((got.width, got.height), (2, 1));
    assert_eq!(store.decode_count(id), 0);
    assert_eq!(store.len(), 1);
}

#[test]
fn missing_file_is_resource_error_and_not_cached() {
    let mut store = AssetStore::new(std::env::temp_dir().join("maskflow-missing-root"));
    let err = store.load_image("nope.png").unwrap_err();
    assert!(err.is_resource());
    assert!(store.is_empty());
}
