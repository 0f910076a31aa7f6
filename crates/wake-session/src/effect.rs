/// Work the state machine asks its host to carry out, in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Begin a new continuous recognition session.
    StartRecognition,
    /// Terminate the current session; its end arrives later as an event.
    StopRecognition,
    /// Resolve `utterance` and report back with the same `seq`.
    Dispatch { seq: u64, utterance: String },
    /// Fire-and-forget speech.
    Speak { text: String },
}
