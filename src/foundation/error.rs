/// Convenience result type used across mandelpix.
pub type MandelpixResult<T> = Result<T, MandelpixError>;

/// Top-level error taxonomy used by library APIs.
#[derive(thiserror::Error, Debug)]
pub enum MandelpixError {
    /// Invalid user-provided render parameters.
    #[error("validation error: {0}")]
    Validation(String),

    /// A requested compute backend cannot run on this machine.
    #[error("backend error: {0}")]
    Backend(String),

    /// Errors when serializing or deserializing render specs.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Errors reading or writing raster data.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapped lower-level error from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MandelpixError {
    /// Build a [`MandelpixError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`MandelpixError::Backend`] value.
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    /// Build a [`MandelpixError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}
