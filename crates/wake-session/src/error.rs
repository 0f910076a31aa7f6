use speech_io::SpeechError;
use thiserror::Error;

pub type Result<T, E = SessionError> = core::result::Result<T, E>;

/// Errors that stop the listening loop. Everything recoverable is absorbed
/// into the session status instead.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("capability unsupported: {0}")]
    CapabilityUnsupported(#[source] SpeechError),
    #[error("invalid session configuration: {0}")]
    Config(String),
}
