/// Convenience result type used across segmask.
pub type SegmaskResult<T> = Result<T, SegmaskError>;

/// Top-level error taxonomy used by the crate's APIs.
#[derive(thiserror::Error, Debug)]
pub enum SegmaskError {
    /// Invalid caller-provided data (dimensions, class lookups, settings).
    #[error("validation error: {0}")]
    Validation(String),

    /// An annotation record did not match any recognised shape.
    #[error("classification error: {0}")]
    Classification(String),

    /// Errors when serializing or deserializing payloads.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Errors while rasterizing or encoding a mask.
    #[error("render error: {0}")]
    Render(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SegmaskError {
    /// Build a [`SegmaskError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`SegmaskError::Classification`] value.
    pub fn classification(msg: impl Into<String>) -> Self {
        Self::Classification(msg.into())
    }

    /// Build a [`SegmaskError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Build a [`SegmaskError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
