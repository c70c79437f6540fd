/// Convenience result type used across the flipbook engine.
pub type FlipbookResult<T> = Result<T, FlipbookError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Only construction and IO edges produce errors. Degenerate folds, missing
/// neighbor pages and pointer input during an animation are steady states with
/// a defined fallback, not failures.
#[derive(thiserror::Error, Debug)]
pub enum FlipbookError {
    /// Invalid caller-provided data (page sequences, page boxes, configuration).
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors while turning a layer stack into pixels.
    #[error("render error: {0}")]
    Render(String),

    /// Errors while synthesizing or delivering the flip cue.
    #[error("audio error: {0}")]
    Audio(String),

    /// Filesystem errors with the offending path already formatted in.
    #[error("io error: {0}")]
    Io(String),

    /// Wrapped lower-level error from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FlipbookError {
    /// Build a [`FlipbookError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`FlipbookError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`FlipbookError::Audio`] value.
    pub fn audio(msg: impl Into<String>) -> Self {
        Self::Audio(msg.into())
    }

    /// Build a [`FlipbookError::Io`] value.
    pub fn io(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
