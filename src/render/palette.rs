use crate::foundation::error::{MaskflowError, MaskflowResult};

/// Particle colors, indexed by each particle's `color_index`.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Palette {
    colors: Vec<[u8; 3]>,
}

impl Palette {
    /// Build a palette from straight RGB triples. At most 256 entries.
    pub fn new(colors: Vec<[u8; 3]>) -> MaskflowResult<Self> {
        let out = Self { colors };
        out.validate()?;
        Ok(out)
    }

    pub(crate) fn validate(&self) -> MaskflowResult<()> {
        if self.colors.is_empty() {
            return Err(MaskflowError::validation("palette must not be empty"));
        }
        if self.colors.len() > usize::from(u8::MAX) + 1 {
            return Err(MaskflowError::validation(format!(
                "palette has {} entries, at most 256 are addressable",
                self.colors.len()
            )));
        }
        Ok(())
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Return `true` when the palette has no entries.
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Color for `index`, wrapping around the palette.
    pub fn color(&self, index: u8) -> [u8; 3] {
        match self.colors.len() {
            0 => [255, 255, 255],
            n => self.colors[usize::from(index) % n],
        }
    }
}

impl Default for Palette {
    /// White plus a warm gold accent.
    fn default() -> Self {
        Self {
            colors: vec![[255, 255, 255], [247, 203, 105]],
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/palette.rs"]
mod tests;
