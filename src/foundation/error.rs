/// Convenience result type used across maskflow.
pub type MaskflowResult<T> = Result<T, MaskflowError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum MaskflowError {
    /// Invalid user-provided configuration or input data.
    #[error("validation error: {0}")]
    Validation(String),

    /// An image asset could not be read or decoded.
    ///
    /// This is terminal for the scene that requested it; nothing retries.
    #[error("resource error: {0}")]
    Resource(String),

    /// Errors raised while executing a render pass.
    #[error("render error: {0}")]
    Render(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MaskflowError {
    /// Build a [`MaskflowError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`MaskflowError::Resource`] value.
    pub fn resource(msg: impl Into<String>) -> Self {
        Self::Resource(msg.into())
    }

    /// Build a [`MaskflowError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Return `true` for asset loading failures.
    pub fn is_resource(&self) -> bool {
        matches!(self, Self::Resource(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
