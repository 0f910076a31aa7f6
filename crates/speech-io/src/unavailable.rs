use crate::{Recognizer, Result, SpeechError};

/// Stand-in for hosts without any recognition capability.
#[derive(Debug, Default)]
pub struct UnavailableRecognizer;

impl Recognizer for UnavailableRecognizer {
    fn start(&mut self) -> Result<()> {
        Err(SpeechError::Unsupported("speech recognition"))
    }

    fn stop(&mut self) {}

    fn name(&self) -> &'static str {
        "unavailable"
    }
}
