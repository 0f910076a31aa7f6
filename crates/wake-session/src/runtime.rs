use crate::{
    DispatchOutcome, Dispatcher, Effect, Result, SessionError, SessionState, WakeWordStateMachine,
};
use speech_io::{RecognitionEvent, Recognizer, SpeakOutcome, SpeechOutput};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;

const START_BACKOFF: Duration = Duration::from_millis(250);
const MAX_START_BACKOFF: Duration = Duration::from_secs(8);

type Completion = (u64, DispatchOutcome);

/// Drives a [`WakeWordStateMachine`] against real capabilities.
///
/// Recognition events and dispatch completions are funnelled into one task,
/// so the machine sees them strictly one at a time. Dispatches run on
/// spawned tasks and report back through an internal queue. A recognizer
/// that fails to start is retried on a capped backoff timer; only a missing
/// capability ends the loop.
pub struct AssistantRuntime {
    machine: WakeWordStateMachine,
    recognizer: Box<dyn Recognizer>,
    events: mpsc::UnboundedReceiver<RecognitionEvent>,
    speech: SpeechOutput,
    dispatcher: Arc<Dispatcher>,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
    state_tx: watch::Sender<SessionState>,
    start_backoff: Duration,
    next_backoff: Duration,
    failed_starts: u32,
    retry_at: Option<Instant>,
}

impl AssistantRuntime {
    pub fn new(
        machine: WakeWordStateMachine,
        recognizer: Box<dyn Recognizer>,
        events: mpsc::UnboundedReceiver<RecognitionEvent>,
        speech: SpeechOutput,
        dispatcher: Arc<Dispatcher>,
    ) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        let (state_tx, _) = watch::channel(machine.state().clone());
        Self {
            machine,
            recognizer,
            events,
            speech,
            dispatcher,
            completions_tx,
            completions_rx,
            state_tx,
            start_backoff: START_BACKOFF,
            next_backoff: START_BACKOFF,
            failed_starts: 0,
            retry_at: None,
        }
    }

    /// Override the initial delay between failed recognition starts.
    pub fn with_start_backoff(mut self, backoff: Duration) -> Self {
        self.start_backoff = backoff;
        self.next_backoff = backoff;
        self
    }

    /// Presentation snapshots; every transition publishes a whole state.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    /// Run until `shutdown` resolves, the recognition queue closes, or
    /// recognition turns out to be unusable.
    pub async fn run(mut self, shutdown: impl Future<Output = ()>) -> Result<()> {
        tokio::pin!(shutdown);
        tracing::info!(
            recognizer = self.recognizer.name(),
            synthesis = self.speech.is_available(),
            "assistant runtime starting"
        );

        let boot = self.machine.boot();
        self.publish();
        self.apply(boot)?;

        loop {
            let effects = tokio::select! {
                biased;
                _ = &mut shutdown => {
                    tracing::info!("shutdown requested");
                    break;
                }
                event = self.events.recv() => match event {
                    Some(event) => {
                        tracing::trace!(?event, phase = %self.machine.phase(), "recognition event");
                        self.machine.handle(event)
                    }
                    None => {
                        tracing::info!("recognition queue closed");
                        break;
                    }
                },
                Some((seq, outcome)) = self.completions_rx.recv() => {
                    self.machine.on_dispatch_complete(seq, outcome)
                }
                _ = wait_until(self.retry_at) => {
                    self.retry_at = None;
                    self.machine.resume()
                }
            };
            self.publish();
            self.apply(effects)?;
        }

        self.recognizer.stop();
        Ok(())
    }

    fn apply(&mut self, effects: Vec<Effect>) -> Result<()> {
        for effect in effects {
            match effect {
                Effect::StartRecognition => self.start_recognition()?,
                Effect::StopRecognition => self.recognizer.stop(),
                Effect::Dispatch { seq, utterance } => self.spawn_dispatch(seq, utterance),
                Effect::Speak { text } => match self.speech.speak(&text) {
                    SpeakOutcome::Requested => {}
                    SpeakOutcome::Unavailable => {
                        self.machine.on_speech_unavailable();
                        self.publish();
                    }
                    SpeakOutcome::Failed => {
                        self.machine.on_speech_failed();
                        self.publish();
                    }
                },
            }
        }
        Ok(())
    }

    fn start_recognition(&mut self) -> Result<()> {
        match self.recognizer.start() {
            Ok(()) => {
                tracing::debug!(after_failures = self.failed_starts, "recognition started");
                self.failed_starts = 0;
                self.next_backoff = self.start_backoff;
                self.retry_at = None;
                Ok(())
            }
            Err(e) if e.is_fatal() => {
                tracing::error!(error = %e, "recognition unavailable");
                self.machine.on_capability_unsupported(&e);
                self.publish();
                Err(SessionError::CapabilityUnsupported(e))
            }
            Err(e) => {
                self.failed_starts += 1;
                let delay = self.next_backoff;
                tracing::warn!(
                    error = %e,
                    attempt = self.failed_starts,
                    ?delay,
                    "recognition start failed, retrying"
                );
                self.machine.on_start_failed(&e);
                self.publish();
                self.retry_at = Some(Instant::now() + delay);
                self.next_backoff = (delay * 2).min(MAX_START_BACKOFF);
                Ok(())
            }
        }
    }

    fn spawn_dispatch(&self, seq: u64, utterance: String) {
        let dispatcher = self.dispatcher.clone();
        let tx = self.completions_tx.clone();
        tokio::spawn(async move {
            let outcome = dispatcher.dispatch(&utterance).await;
            if tx.send((seq, outcome)).is_err() {
                tracing::debug!(seq, "runtime gone, dispatch result dropped");
            }
        });
    }

    fn publish(&self) {
        let next = self.machine.state();
        self.state_tx.send_if_modified(|current| {
            if current == next {
                false
            } else {
                *current = next.clone();
                true
            }
        });
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}
