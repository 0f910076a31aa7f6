use crate::Result;

/// A continuous speech-recognition session provider.
///
/// Results are not returned from these calls; backends push them into the
/// [`crate::RecognitionSink`] they were constructed with.
pub trait Recognizer: Send {
    /// Begin a continuous session. Fails with
    /// [`crate::SpeechError::Unsupported`] when the host cannot recognise
    /// speech at all.
    fn start(&mut self) -> Result<()>;

    /// Request termination. Completion is observed through
    /// [`crate::RecognitionEvent::Ended`], not through this call.
    fn stop(&mut self);

    fn name(&self) -> &'static str;
}

/// A fire-and-forget speech synthesis provider.
pub trait Synthesizer: Send {
    fn speak(&mut self, text: &str, language: &str) -> Result<()>;

    fn name(&self) -> &'static str;
}
