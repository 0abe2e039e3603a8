/// Convenience result type used across lyricframe.
pub type LyricResult<T> = Result<T, LyricError>;

/// Top-level error taxonomy used by the render APIs.
///
/// Messages carry the operation and the file or segment involved so a failed
/// batch item can be corrected and re-run on its own.
#[derive(thiserror::Error, Debug)]
pub enum LyricError {
    /// Missing or invalid folder, unmatched audio, malformed config file.
    #[error("config error: {0}")]
    Config(String),

    /// Unreadable image, font, audio or transcript.
    #[error("asset error: {0}")]
    Asset(String),

    /// Encoder failure or an invalid frame.
    #[error("render error: {0}")]
    Render(String),

    /// Malformed effect parameters (unknown effect name, bad colour).
    #[error("effect error: {0}")]
    Effect(String),

    /// The job-scoped cancellation token was tripped between frames.
    #[error("render cancelled")]
    Cancelled,

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LyricError {
    /// Build a [`LyricError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`LyricError::Asset`] value.
    pub fn asset(msg: impl Into<String>) -> Self {
        Self::Asset(msg.into())
    }

    /// Build a [`LyricError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`LyricError::Effect`] value.
    pub fn effect(msg: impl Into<String>) -> Self {
        Self::Effect(msg.into())
    }

    /// `true` when the error came from cancellation rather than a fault.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
