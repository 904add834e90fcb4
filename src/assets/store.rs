use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{
    assets::decode as assets_decode,
    foundation::error::{MaskflowError, MaskflowResult},
    foundation::math::Fnv1a64,
};

#[derive(Clone, Debug)]
/// Decoded raster image in straight-alpha RGBA8 form, as read back from a 2D canvas.
pub struct DecodedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major straight-alpha RGBA8.
    pub rgba8: Arc<Vec<u8>>,
}

impl DecodedImage {
    /// Width divided by height.
    pub fn aspect(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height.max(1))
    }
}

#[derive(Clone, Debug)]
/// Prepared raster image in premultiplied RGBA8 form.
pub struct PreparedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// Stable hashed identifier for an image source.
pub struct AssetId(pub(crate) u64);

impl AssetId {
    /// Access raw 64-bit identifier.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// Decode-once image cache rooted at a directory.
///
/// Each distinct normalized source path is read and decoded at most once; later requests for the
/// same identity share the decoded pixels. Failed loads are not cached.
#[derive(Debug)]
pub struct AssetStore {
    root: PathBuf,
    images: HashMap<AssetId, DecodedImage>,
    decode_counts: HashMap<AssetId, u32>,
}

impl AssetStore {
    /// Create an empty store that resolves relative sources against `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            images: HashMap::new(),
            decode_counts: HashMap::new(),
        }
    }

    /// Filesystem root used to resolve sources.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Return the identity a source resolves to.
    pub fn id_for(&self, source: &str) -> MaskflowResult<AssetId> {
        let norm = normalize_rel_path(source)?;
        Ok(Self::hash_id_for_path(&norm))
    }

    /// Load (or fetch from cache) the image at `source`.
    #[tracing::instrument(skip(self))]
    pub fn load_image(&mut self, source: &str) -> MaskflowResult<DecodedImage> {
        let norm = normalize_rel_path(source)?;
        let id = Self::hash_id_for_path(&norm);
        if let Some(img) = self.images.get(&id) {
            return Ok(img.clone());
        }

        let bytes = self.read_bytes(&norm)?;
        let decoded = assets_decode::decode_image(&bytes).map_err(|e| match e {
            MaskflowError::Resource(msg) => {
                MaskflowError::resource(format!("image '{norm}': {msg}"))
            }
            other => other,
        })?;
        *self.decode_counts.entry(id).or_insert(0) += 1;
        tracing::debug!(
            source = %norm,
            width = decoded.width,
            height = decoded.height,
            "decoded image"
        );
        self.images.insert(id, decoded.clone());
        Ok(decoded)
    }

    /// Register an already-decoded image under `source`, bypassing IO.
    ///
    /// Hosts that decode images themselves use this to feed the cache.
    pub fn insert_image(&mut self, source: &str, image: DecodedImage) -> MaskflowResult<AssetId> {
        let id = self.id_for(source)?;
        self.images.insert(id, image);
        Ok(id)
    }

    /// Number of times the image with `id` was decoded from bytes.
    pub fn decode_count(&self, id: AssetId) -> u32 {
        self.decode_counts.get(&id).copied().unwrap_or(0)
    }

    /// Number of cached images.
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Return `true` when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    fn hash_id_for_path(norm_path: &str) -> AssetId {
        let mut hasher = Fnv1a64::new_default();
        hasher.write_u8(b'I');
        hasher.write_bytes(norm_path.as_bytes());
        hasher.write_u8(0);
        AssetId(hasher.finish())
    }

    fn read_bytes(&self, norm_path: &str) -> MaskflowResult<Vec<u8>> {
        let path = self.root.join(Path::new(norm_path));
        std::fs::read(&path).map_err(|e| {
            MaskflowError::resource(format!("read image bytes from '{}': {e}", path.display()))
        })
    }
}

/// Normalize and validate relative asset paths.
///
/// The normalized result uses `/` separators, removes `.` segments, and rejects absolute paths or
/// parent traversals (`..`).
pub fn normalize_rel_path(source: &str) -> MaskflowResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(MaskflowError::validation("asset paths must be relative"));
    }
    if s.is_empty() {
        return Err(MaskflowError::validation("asset path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(MaskflowError::validation(
                "asset paths must not contain '..'",
            ));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(MaskflowError::validation(
            "asset path must contain a file name",
        ));
    }

    Ok(out.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/store.rs"]
mod tests;
