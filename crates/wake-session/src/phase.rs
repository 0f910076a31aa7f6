use serde::Serialize;

/// Listening phase of the assistant. Exactly one is active at a time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum ListeningPhase {
    /// Waiting for the wake word.
    #[default]
    Idle,
    /// Wake word heard; the next final utterance is the command.
    Armed,
    /// Command captured, dispatch in flight.
    Processing,
}

impl ListeningPhase {
    pub fn is_armed(&self) -> bool {
        matches!(self, ListeningPhase::Armed)
    }

    pub fn is_processing(&self) -> bool {
        matches!(self, ListeningPhase::Processing)
    }
}

impl std::fmt::Display for ListeningPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListeningPhase::Idle => write!(f, "Idle"),
            ListeningPhase::Armed => write!(f, "Armed"),
            ListeningPhase::Processing => write!(f, "Processing"),
        }
    }
}
