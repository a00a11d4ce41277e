/// Convenience result type used across the crate.
pub type ParticleResult<T> = Result<T, ParticleError>;

/// Top-level error taxonomy used by the generator APIs.
#[derive(thiserror::Error, Debug)]
pub enum ParticleError {
    /// Invalid user-provided data or configuration.
    #[error("validation error: {0}")]
    Validation(String),

    /// A rejected upload (missing payload, wrong media type, oversized).
    #[error("upload error: {0}")]
    Upload(String),

    /// The external conversion program failed to produce an output.
    #[error("conversion error: {0}")]
    Conversion(String),

    /// Errors while writing frames into an output asset.
    #[error("encode error: {0}")]
    Encode(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ParticleError {
    /// Build a [`ParticleError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ParticleError::Upload`] value.
    pub fn upload(msg: impl Into<String>) -> Self {
        Self::Upload(msg.into())
    }

    /// Build a [`ParticleError::Conversion`] value.
    pub fn conversion(msg: impl Into<String>) -> Self {
        Self::Conversion(msg.into())
    }

    /// Build a [`ParticleError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`ParticleError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Errors caused by the caller's input rather than by the server.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Upload(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
