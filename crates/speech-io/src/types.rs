use serde::{Deserialize, Serialize};

/// Normalised recognition event, consumed exactly once in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionEvent {
    /// Interim transcript the engine may still revise.
    Partial { text: String },
    /// Transcript the engine will not revise further.
    Final { text: String },
    /// Host-reported recognition error (e.g. `no-speech`, `network`).
    Error { code: String },
    /// The continuous session terminated, either after `stop()` or on its own.
    Ended,
}

/// One entry of a host result batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostResult {
    pub is_final: bool,
    pub transcript: String,
}

impl HostResult {
    pub fn interim(transcript: impl Into<String>) -> Self {
        Self {
            is_final: false,
            transcript: transcript.into(),
        }
    }

    pub fn final_result(transcript: impl Into<String>) -> Self {
        Self {
            is_final: true,
            transcript: transcript.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognitionConfig {
    /// BCP-47 language tag, fixed for the lifetime of the recognizer.
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_true")]
    pub continuous: bool,
    #[serde(default = "default_true")]
    pub interim_results: bool,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            continuous: true,
            interim_results: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisConfig {
    #[serde(default = "default_language")]
    pub language: String,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
        }
    }
}

fn default_language() -> String {
    "it-IT".to_string()
}

fn default_true() -> bool {
    true
}
