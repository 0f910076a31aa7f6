use thiserror::Error;

pub type Result<T, E = SpeechError> = core::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum SpeechError {
    /// The host has no such capability at all. Not retryable.
    #[error("capability not supported on this host: {0}")]
    Unsupported(&'static str),
    #[error("backend error: {0}")]
    Backend(String),
}

impl SpeechError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, SpeechError::Unsupported(_))
    }
}
