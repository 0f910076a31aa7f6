use crate::{SpeechError, SynthesisConfig, Synthesizer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeakOutcome {
    /// The text was handed to the synthesis capability.
    Requested,
    /// No usable synthesis capability; the caller should only show the text.
    Unavailable,
    /// The capability exists but refused this request.
    Failed,
}

/// Speech output adapter. Never blocks on playback and never propagates
/// synthesis failures to the caller.
pub struct SpeechOutput {
    synthesizer: Option<Box<dyn Synthesizer>>,
    language: String,
}

impl SpeechOutput {
    pub fn new(synthesizer: Option<Box<dyn Synthesizer>>, config: &SynthesisConfig) -> Self {
        Self {
            synthesizer,
            language: config.language.clone(),
        }
    }

    pub fn is_available(&self) -> bool {
        self.synthesizer.is_some()
    }

    pub fn speak(&mut self, text: &str) -> SpeakOutcome {
        let Some(synth) = self.synthesizer.as_mut() else {
            return SpeakOutcome::Unavailable;
        };
        match synth.speak(text, &self.language) {
            Ok(()) => {
                tracing::debug!(backend = synth.name(), chars = text.len(), "speech requested");
                SpeakOutcome::Requested
            }
            Err(SpeechError::Unsupported(what)) => {
                tracing::warn!(what, "synthesis unsupported on this host");
                SpeakOutcome::Unavailable
            }
            Err(e) => {
                tracing::warn!(error = %e, "synthesis request failed");
                SpeakOutcome::Failed
            }
        }
    }
}
