use crate::ListeningPhase;
use serde::Serialize;

/// Read-only projection of the assistant for presentation.
///
/// Never mutated in place: every transition builds a new value from the
/// previous one, and subscribers receive whole snapshots.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SessionState {
    pub phase: ListeningPhase,
    /// Captured command utterance of the current cycle.
    pub transcript: Option<String>,
    /// Most recent reply, kept until the next dispatch starts.
    pub reply: Option<String>,
    pub status: String,
}

impl SessionState {
    pub fn new(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            ..Self::default()
        }
    }

    pub fn with_status(&self, status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            ..self.clone()
        }
    }

    pub fn armed(&self, status: impl Into<String>) -> Self {
        Self {
            phase: ListeningPhase::Armed,
            transcript: None,
            reply: self.reply.clone(),
            status: status.into(),
        }
    }

    pub fn processing(&self, utterance: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            phase: ListeningPhase::Processing,
            transcript: Some(utterance.into()),
            reply: None,
            status: status.into(),
        }
    }

    /// Back to `Idle` with the captured utterance cleared.
    pub fn reset(&self, status: impl Into<String>) -> Self {
        Self {
            phase: ListeningPhase::Idle,
            transcript: None,
            reply: self.reply.clone(),
            status: status.into(),
        }
    }

    pub fn replied(&self, reply: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            phase: ListeningPhase::Idle,
            transcript: None,
            reply: Some(reply.into()),
            status: status.into(),
        }
    }
}
