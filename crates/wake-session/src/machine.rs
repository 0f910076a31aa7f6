use crate::{status, DispatchOutcome, Effect, ListeningPhase, Result, SessionError, SessionState};
use serde::{Deserialize, Serialize};
use speech_io::{RecognitionEvent, SpeechError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Token searched (case-insensitively) in final results while idle.
    #[serde(default = "default_wake_word")]
    pub wake_word: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            wake_word: default_wake_word(),
        }
    }
}

fn default_wake_word() -> String {
    "tifa".to_string()
}

/// Why the machine asked the recognizer to stop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum StopReason {
    Dispatch,
    Reset,
}

/// Wake-word listening state machine.
///
/// Phases cycle `Idle -> Armed -> Processing -> Idle`. Errors always route
/// back to `Idle`. Each dispatch carries a sequence number; a completion is
/// applied only if its number is the one currently in flight.
#[derive(Debug)]
pub struct WakeWordStateMachine {
    wake_word: String,
    prompt: String,
    state: SessionState,
    next_seq: u64,
    in_flight: Option<u64>,
    stream_active: bool,
    stop_reason: Option<StopReason>,
}

impl WakeWordStateMachine {
    pub fn new(config: &SessionConfig) -> Result<Self> {
        let wake_word = config.wake_word.trim().to_lowercase();
        if wake_word.is_empty() {
            return Err(SessionError::Config("wake word must not be empty".into()));
        }
        let prompt = status::prompt(&wake_word);
        Ok(Self {
            state: SessionState::new(prompt.clone()),
            wake_word,
            prompt,
            next_seq: 0,
            in_flight: None,
            stream_active: false,
            stop_reason: None,
        })
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> ListeningPhase {
        self.state.phase
    }

    pub fn in_flight(&self) -> Option<u64> {
        self.in_flight
    }

    /// Effects that bring the assistant up: the first recognition session.
    pub fn boot(&mut self) -> Vec<Effect> {
        self.state = SessionState::new(self.prompt.clone());
        self.start()
    }

    pub fn handle(&mut self, event: RecognitionEvent) -> Vec<Effect> {
        match event {
            RecognitionEvent::Partial { text } => self.on_partial(&text),
            RecognitionEvent::Final { text } => self.on_final(&text),
            RecognitionEvent::Error { code } => self.on_error(&code),
            RecognitionEvent::Ended => self.on_ended(),
        }
    }

    pub fn on_partial(&mut self, text: &str) -> Vec<Effect> {
        if !self.state.phase.is_processing() {
            self.state = self.state.with_status(status::hearing(text));
        }
        Vec::new()
    }

    pub fn on_final(&mut self, text: &str) -> Vec<Effect> {
        match self.state.phase {
            ListeningPhase::Idle => {
                if text.to_lowercase().contains(&self.wake_word) {
                    tracing::info!(transcript = text, "wake word detected");
                    self.state = self.state.armed(status::WAKE_DETECTED);
                } else {
                    tracing::trace!(transcript = text, "no wake word");
                }
                Vec::new()
            }
            ListeningPhase::Armed => {
                self.next_seq += 1;
                let seq = self.next_seq;
                self.in_flight = Some(seq);
                self.stop_reason = Some(StopReason::Dispatch);
                self.state = self.state.processing(text, status::THINKING);
                tracing::info!(seq, utterance = text, "dispatching utterance");
                vec![
                    Effect::StopRecognition,
                    Effect::Dispatch {
                        seq,
                        utterance: text.to_string(),
                    },
                ]
            }
            ListeningPhase::Processing => {
                tracing::debug!(transcript = text, "final ignored while processing");
                Vec::new()
            }
        }
    }

    /// Recoverable recognition error: back to `Idle`, in-flight dispatch
    /// abandoned, stream restarted through its end notification.
    pub fn on_error(&mut self, code: &str) -> Vec<Effect> {
        tracing::warn!(code, phase = %self.state.phase, "recognition error");
        if let Some(seq) = self.in_flight.take() {
            tracing::debug!(seq, "dispatch abandoned");
        }
        self.state = self.state.reset(status::recognition_error(code));
        if self.stream_active {
            self.stop_reason = Some(StopReason::Reset);
            vec![Effect::StopRecognition]
        } else {
            self.start()
        }
    }

    pub fn on_ended(&mut self) -> Vec<Effect> {
        self.stream_active = false;
        let reason = self.stop_reason.take();
        match self.state.phase {
            ListeningPhase::Processing => {
                // Restart waits for the dispatch to complete.
                tracing::debug!(?reason, "recognition ended for dispatch");
                Vec::new()
            }
            ListeningPhase::Armed => {
                tracing::info!("recognition ended while armed, disarming");
                self.state = self.state.reset(self.prompt.clone());
                self.start()
            }
            ListeningPhase::Idle => {
                tracing::debug!(?reason, "recognition ended, restarting");
                self.start()
            }
        }
    }

    pub fn on_dispatch_complete(&mut self, seq: u64, outcome: DispatchOutcome) -> Vec<Effect> {
        if self.in_flight != Some(seq) || !self.state.phase.is_processing() {
            tracing::info!(seq, current = ?self.in_flight, "stale dispatch result discarded");
            return Vec::new();
        }
        self.in_flight = None;

        let mut effects = Vec::new();
        match outcome {
            Ok(reply) => {
                tracing::info!(seq, source = ?reply.source, "reply ready");
                self.state = self.state.replied(reply.text.clone(), status::REPLY_READY);
                effects.push(Effect::Speak { text: reply.text });
            }
            Err(e) => {
                tracing::warn!(seq, error = %e, "dispatch failed");
                self.state = self.state.reset(status::completion_error(&e));
            }
        }
        if self.stream_active {
            // The stop for this dispatch has not ended yet; its end restarts.
            tracing::debug!(seq, "restart deferred to pending end");
        } else {
            effects.extend(self.start());
        }
        effects
    }

    /// The synthesis capability is missing; the reply stays visible.
    pub fn on_speech_unavailable(&mut self) {
        self.state = self.state.with_status(status::SYNTHESIS_UNAVAILABLE);
    }

    /// Synthesis exists but rejected this reply; the reply stays visible.
    pub fn on_speech_failed(&mut self) {
        self.state = self.state.with_status(status::SYNTHESIS_FAILED);
    }

    /// A recoverable start failure. The host retries later through
    /// [`WakeWordStateMachine::resume`].
    pub fn on_start_failed(&mut self, error: &SpeechError) {
        self.stream_active = false;
        self.stop_reason = None;
        self.state = self.state.reset(status::recognition_error(&error.to_string()));
    }

    /// Ask for a fresh recognition session unless one is already running.
    pub fn resume(&mut self) -> Vec<Effect> {
        if self.stream_active {
            Vec::new()
        } else {
            self.start()
        }
    }

    /// Recognition itself is unsupported. Nothing is scheduled afterwards.
    pub fn on_capability_unsupported(&mut self, error: &SpeechError) {
        let what = match error {
            SpeechError::Unsupported(what) => (*what).to_string(),
            other => other.to_string(),
        };
        self.stream_active = false;
        self.in_flight = None;
        self.state = self.state.reset(status::unsupported(&what));
    }

    fn start(&mut self) -> Vec<Effect> {
        self.stream_active = true;
        vec![Effect::StartRecognition]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Reply, ReplySource};
    use chat_completion::CompletionError;

    fn machine() -> WakeWordStateMachine {
        let mut m = WakeWordStateMachine::new(&SessionConfig::default()).unwrap();
        assert_eq!(m.boot(), vec![Effect::StartRecognition]);
        m
    }

    fn final_(text: &str) -> RecognitionEvent {
        RecognitionEvent::Final { text: text.into() }
    }

    fn reply(text: &str) -> DispatchOutcome {
        Ok(Reply {
            text: text.into(),
            source: ReplySource::Conversation,
        })
    }

    fn dispatch_seq(effects: &[Effect]) -> u64 {
        effects
            .iter()
            .find_map(|e| match e {
                Effect::Dispatch { seq, .. } => Some(*seq),
                _ => None,
            })
            .unwrap()
    }

    #[test]
    fn empty_wake_word_is_rejected() {
        let cfg = SessionConfig {
            wake_word: "  ".into(),
        };
        assert!(matches!(
            WakeWordStateMachine::new(&cfg),
            Err(SessionError::Config(_))
        ));
    }

    #[test]
    fn finals_without_wake_word_never_dispatch() {
        let mut m = machine();
        for text in ["buongiorno", "che tempo fa", "accendi luci", ""] {
            assert!(m.handle(final_(text)).is_empty());
            assert_eq!(m.phase(), ListeningPhase::Idle);
        }
        assert_eq!(m.in_flight(), None);
    }

    #[test]
    fn wake_word_arms_case_insensitively() {
        let mut m = machine();
        assert!(m.handle(final_("Ehi TIFA")).is_empty());
        assert_eq!(m.phase(), ListeningPhase::Armed);
        assert_eq!(m.state().status, status::WAKE_DETECTED);
    }

    #[test]
    fn next_final_after_wake_dispatches_exactly_once() {
        let mut m = machine();
        m.handle(final_("ehi tifa"));
        let effects = m.handle(final_("tifa, che ore sono"));
        assert_eq!(
            effects,
            vec![
                Effect::StopRecognition,
                Effect::Dispatch {
                    seq: 1,
                    utterance: "tifa, che ore sono".into()
                }
            ]
        );
        assert_eq!(m.phase(), ListeningPhase::Processing);
        assert_eq!(m.state().transcript.as_deref(), Some("tifa, che ore sono"));
        assert_eq!(m.state().status, status::THINKING);

        // Trailing finals before the stream actually stops are ignored.
        assert!(m.handle(final_("ancora parole")).is_empty());
        assert!(m.handle(RecognitionEvent::Partial { text: "x".into() }).is_empty());
        assert_eq!(m.state().status, status::THINKING);
    }

    #[test]
    fn partial_updates_status_only() {
        let mut m = machine();
        m.handle(RecognitionEvent::Partial {
            text: "ehi ti".into(),
        });
        assert_eq!(m.phase(), ListeningPhase::Idle);
        assert_eq!(m.state().status, "Ascolto... ehi ti");
    }

    #[test]
    fn completion_returns_to_idle_and_restarts() {
        let mut m = machine();
        m.handle(final_("tifa"));
        let seq = dispatch_seq(&m.handle(final_("ciao")));

        assert!(m.handle(RecognitionEvent::Ended).is_empty());

        let effects = m.on_dispatch_complete(seq, reply("Ciao a te"));
        assert_eq!(
            effects,
            vec![
                Effect::Speak {
                    text: "Ciao a te".into()
                },
                Effect::StartRecognition
            ]
        );
        assert_eq!(m.phase(), ListeningPhase::Idle);
        assert_eq!(m.state().transcript, None);
        assert_eq!(m.state().reply.as_deref(), Some("Ciao a te"));
        assert_eq!(m.state().status, status::REPLY_READY);
    }

    #[test]
    fn failed_dispatch_still_restarts() {
        let mut m = machine();
        m.handle(final_("tifa"));
        let seq = dispatch_seq(&m.handle(final_("domanda")));
        m.handle(RecognitionEvent::Ended);

        let effects = m.on_dispatch_complete(seq, Err(CompletionError::Network("down".into())));
        assert_eq!(effects, vec![Effect::StartRecognition]);
        assert_eq!(m.phase(), ListeningPhase::Idle);
        assert!(m.state().status.starts_with("Errore comunicazione modello"));
    }

    #[test]
    fn completion_before_end_defers_restart_to_end() {
        let mut m = machine();
        m.handle(final_("tifa"));
        let seq = dispatch_seq(&m.handle(final_("ciao")));

        let effects = m.on_dispatch_complete(seq, reply("ok"));
        assert_eq!(effects, vec![Effect::Speak { text: "ok".into() }]);
        assert_eq!(m.phase(), ListeningPhase::Idle);

        assert_eq!(m.handle(RecognitionEvent::Ended), vec![Effect::StartRecognition]);
    }

    #[test]
    fn spontaneous_end_restarts_and_disarms() {
        let mut m = machine();
        assert_eq!(m.handle(RecognitionEvent::Ended), vec![Effect::StartRecognition]);
        assert_eq!(m.phase(), ListeningPhase::Idle);

        m.handle(final_("tifa"));
        assert_eq!(m.handle(RecognitionEvent::Ended), vec![Effect::StartRecognition]);
        assert_eq!(m.phase(), ListeningPhase::Idle);
        assert_eq!(m.state().status, status::prompt("tifa"));
    }

    #[test]
    fn error_resets_and_stops_active_stream() {
        let mut m = machine();
        m.handle(final_("tifa"));
        let effects = m.handle(RecognitionEvent::Error {
            code: "no-speech".into(),
        });
        assert_eq!(effects, vec![Effect::StopRecognition]);
        assert_eq!(m.phase(), ListeningPhase::Idle);
        assert_eq!(m.state().status, "Errore riconoscimento vocale: no-speech");

        assert_eq!(m.handle(RecognitionEvent::Ended), vec![Effect::StartRecognition]);
    }

    #[test]
    fn error_after_dispatch_stop_restarts_directly() {
        let mut m = machine();
        m.handle(final_("tifa"));
        m.handle(final_("domanda"));
        m.handle(RecognitionEvent::Ended);

        let effects = m.handle(RecognitionEvent::Error {
            code: "network".into(),
        });
        assert_eq!(effects, vec![Effect::StartRecognition]);
        assert_eq!(m.in_flight(), None);
        assert_eq!(m.state().transcript, None);
    }

    #[test]
    fn stale_completion_is_discarded() {
        let mut m = machine();
        m.handle(final_("tifa"));
        let first = dispatch_seq(&m.handle(final_("prima domanda")));
        m.handle(RecognitionEvent::Ended);
        m.handle(RecognitionEvent::Error {
            code: "aborted".into(),
        });

        m.handle(final_("tifa"));
        let second = dispatch_seq(&m.handle(final_("seconda domanda")));
        assert!(second > first);
        m.handle(RecognitionEvent::Ended);

        let before = m.state().clone();
        assert!(m.on_dispatch_complete(first, reply("vecchia")).is_empty());
        assert_eq!(m.state(), &before);
        assert_eq!(m.phase(), ListeningPhase::Processing);

        let effects = m.on_dispatch_complete(second, reply("nuova"));
        assert_eq!(effects[0], Effect::Speak { text: "nuova".into() });
        assert_eq!(m.state().reply.as_deref(), Some("nuova"));
    }

    #[test]
    fn duplicate_completion_is_ignored() {
        let mut m = machine();
        m.handle(final_("tifa"));
        let seq = dispatch_seq(&m.handle(final_("ciao")));
        m.handle(RecognitionEvent::Ended);
        m.on_dispatch_complete(seq, reply("uno"));
        assert!(m.on_dispatch_complete(seq, reply("due")).is_empty());
        assert_eq!(m.state().reply.as_deref(), Some("uno"));
    }

    #[test]
    fn speech_unavailable_keeps_reply() {
        let mut m = machine();
        m.handle(final_("tifa"));
        let seq = dispatch_seq(&m.handle(final_("ciao")));
        m.handle(RecognitionEvent::Ended);
        m.on_dispatch_complete(seq, reply("testo"));
        m.on_speech_unavailable();
        assert_eq!(m.state().status, status::SYNTHESIS_UNAVAILABLE);
        assert_eq!(m.state().reply.as_deref(), Some("testo"));
    }

    #[test]
    fn new_dispatch_clears_previous_reply() {
        let mut m = machine();
        m.handle(final_("tifa"));
        let seq = dispatch_seq(&m.handle(final_("uno")));
        m.handle(RecognitionEvent::Ended);
        m.on_dispatch_complete(seq, reply("risposta"));

        m.handle(final_("tifa"));
        assert_eq!(m.state().reply.as_deref(), Some("risposta"));
        m.handle(final_("due"));
        assert_eq!(m.state().reply, None);
    }

    #[test]
    fn speech_failure_has_its_own_status() {
        let mut m = machine();
        m.handle(final_("tifa"));
        let seq = dispatch_seq(&m.handle(final_("ciao")));
        m.handle(RecognitionEvent::Ended);
        m.on_dispatch_complete(seq, reply("testo"));
        m.on_speech_failed();
        assert_eq!(m.state().status, status::SYNTHESIS_FAILED);
        assert_eq!(m.state().reply.as_deref(), Some("testo"));
    }

    #[test]
    fn failed_start_waits_for_resume() {
        let mut m = machine();
        m.on_start_failed(&SpeechError::Backend("device busy".into()));
        assert_eq!(m.phase(), ListeningPhase::Idle);
        assert!(m.state().status.contains("device busy"));

        assert_eq!(m.resume(), vec![Effect::StartRecognition]);
        assert!(m.resume().is_empty());
    }

    #[test]
    fn error_before_dispatch_stop_lands_restarts_once() {
        let mut m = machine();
        m.handle(final_("tifa"));
        let effects = m.handle(final_("domanda"));
        let seq = dispatch_seq(&effects);
        assert_eq!(effects[0], Effect::StopRecognition);

        // The dispatch stop has not ended yet: stop again, no start.
        let effects = m.handle(RecognitionEvent::Error {
            code: "network".into(),
        });
        assert_eq!(effects, vec![Effect::StopRecognition]);
        assert_eq!(m.phase(), ListeningPhase::Idle);
        assert_eq!(m.in_flight(), None);

        // The single pending end brings the stream back.
        assert_eq!(m.handle(RecognitionEvent::Ended), vec![Effect::StartRecognition]);

        // The abandoned dispatch neither changes state nor restarts.
        let before = m.state().clone();
        assert!(m.on_dispatch_complete(seq, reply("tardi")).is_empty());
        assert_eq!(m.state(), &before);
    }
}
