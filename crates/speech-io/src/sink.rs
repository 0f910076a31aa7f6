//! Normalisation of raw host recognition callbacks into [`RecognitionEvent`]s.

use crate::{HostResult, RecognitionConfig, RecognitionEvent};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

#[derive(Debug, Default)]
struct Cursor {
    session_open: bool,
    /// Start index of the most recent accepted batch.
    last_batch_index: Option<usize>,
    /// Highest result index already delivered as final.
    finalized_upto: Option<usize>,
}

#[derive(Debug)]
struct Mode {
    continuous: AtomicBool,
    interim_results: AtomicBool,
}

impl Default for Mode {
    fn default() -> Self {
        Self {
            continuous: AtomicBool::new(true),
            interim_results: AtomicBool::new(true),
        }
    }
}

/// Inbound side of the recognition event queue.
///
/// Backends hold a clone and push host results, errors and end notifications.
/// The sink enforces arrival order, drops batches whose result index moves
/// backwards, never re-delivers a final result for an index already
/// finalized, and emits at most one [`RecognitionEvent::Ended`] per session.
/// A non-continuous session ends after its first final result, and interim
/// transcripts are suppressed when interim results are off.
#[derive(Clone)]
pub struct RecognitionSink {
    tx: mpsc::UnboundedSender<RecognitionEvent>,
    cursor: Arc<Mutex<Cursor>>,
    mode: Arc<Mode>,
}

impl RecognitionSink {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<RecognitionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                tx,
                cursor: Arc::new(Mutex::new(Cursor::default())),
                mode: Arc::new(Mode::default()),
            },
            rx,
        )
    }

    pub fn configure(&self, config: &RecognitionConfig) {
        self.mode
            .continuous
            .store(config.continuous, Ordering::SeqCst);
        self.mode
            .interim_results
            .store(config.interim_results, Ordering::SeqCst);
        tracing::debug!(
            continuous = config.continuous,
            interim_results = config.interim_results,
            "recognition mode set"
        );
    }

    /// Mark the beginning of a new continuous session. Backends call this from
    /// `start()`; result indices restart from zero.
    pub fn open_session(&self) {
        if let Ok(mut cursor) = self.cursor.lock() {
            *cursor = Cursor {
                session_open: true,
                ..Cursor::default()
            };
        }
    }

    pub fn is_session_open(&self) -> bool {
        self.cursor.lock().map(|c| c.session_open).unwrap_or(false)
    }

    /// Push one host result batch. `results[0]` carries index `result_index`.
    ///
    /// Every final result becomes one trimmed [`RecognitionEvent::Final`];
    /// interim transcripts of the batch are concatenated into a single
    /// [`RecognitionEvent::Partial`] emitted after the finals.
    pub fn push_results(&self, result_index: usize, results: &[HostResult]) {
        let Ok(mut cursor) = self.cursor.lock() else {
            return;
        };
        if !cursor.session_open {
            tracing::debug!(result_index, "results outside of a session dropped");
            return;
        }
        if let Some(last) = cursor.last_batch_index {
            if result_index < last {
                tracing::warn!(result_index, last, "out-of-order result batch dropped");
                return;
            }
        }
        cursor.last_batch_index = Some(result_index);

        let continuous = self.mode.continuous.load(Ordering::SeqCst);
        let mut interim = String::new();
        for (offset, result) in results.iter().enumerate() {
            let index = result_index + offset;
            if result.is_final {
                if cursor.finalized_upto.is_some_and(|done| index <= done) {
                    tracing::debug!(index, "final result already delivered");
                    continue;
                }
                cursor.finalized_upto = Some(index);
                self.send(RecognitionEvent::Final {
                    text: result.transcript.trim().to_string(),
                });
                if !continuous {
                    cursor.session_open = false;
                    self.send(RecognitionEvent::Ended);
                    return;
                }
            } else {
                interim.push_str(&result.transcript);
            }
        }
        if !interim.is_empty() && self.mode.interim_results.load(Ordering::SeqCst) {
            self.send(RecognitionEvent::Partial { text: interim });
        }
    }

    pub fn push_error(&self, code: impl Into<String>) {
        self.send(RecognitionEvent::Error { code: code.into() });
    }

    /// Report the end of the current session. Repeated calls for the same
    /// session are suppressed.
    pub fn push_ended(&self) {
        let Ok(mut cursor) = self.cursor.lock() else {
            return;
        };
        if !cursor.session_open {
            tracing::debug!("duplicate end notification suppressed");
            return;
        }
        cursor.session_open = false;
        self.send(RecognitionEvent::Ended);
    }

    fn send(&self, event: RecognitionEvent) {
        if self.tx.send(event).is_err() {
            tracing::debug!("recognition queue closed, event dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(rx: &mut mpsc::UnboundedReceiver<RecognitionEvent>) -> Vec<RecognitionEvent> {
        let mut out = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            out.push(ev);
        }
        out
    }

    #[test]
    fn batch_yields_finals_then_joined_partial() {
        let (sink, mut rx) = RecognitionSink::channel();
        sink.open_session();
        sink.push_results(
            0,
            &[
                HostResult::final_result("  ehi tifa "),
                HostResult::interim("che "),
                HostResult::interim("ore"),
            ],
        );
        assert_eq!(
            drain(&mut rx),
            vec![
                RecognitionEvent::Final {
                    text: "ehi tifa".into()
                },
                RecognitionEvent::Partial {
                    text: "che ore".into()
                },
            ]
        );
    }

    #[test]
    fn backwards_batch_and_refinalized_index_are_dropped() {
        let (sink, mut rx) = RecognitionSink::channel();
        sink.open_session();
        sink.push_results(0, &[HostResult::interim("ti")]);
        sink.push_results(0, &[HostResult::final_result("tifa")]);
        sink.push_results(0, &[HostResult::final_result("tifa"), HostResult::interim("ac")]);
        sink.push_results(2, &[HostResult::interim("late")]);
        sink.push_results(1, &[HostResult::final_result("stale")]);

        let events = drain(&mut rx);
        let finals: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, RecognitionEvent::Final { .. }))
            .collect();
        assert_eq!(finals.len(), 1);
        assert_eq!(events.len(), 4);
    }

    #[test]
    fn at_most_one_end_per_session() {
        let (sink, mut rx) = RecognitionSink::channel();
        sink.open_session();
        sink.push_ended();
        sink.push_ended();
        sink.push_results(0, &[HostResult::final_result("after end")]);
        assert_eq!(drain(&mut rx), vec![RecognitionEvent::Ended]);

        sink.open_session();
        sink.push_ended();
        assert_eq!(drain(&mut rx), vec![RecognitionEvent::Ended]);
    }

    #[test]
    fn errors_pass_through_without_closing_session() {
        let (sink, mut rx) = RecognitionSink::channel();
        sink.open_session();
        sink.push_error("no-speech");
        assert!(sink.is_session_open());
        assert_eq!(
            drain(&mut rx),
            vec![RecognitionEvent::Error {
                code: "no-speech".into()
            }]
        );
    }

    #[test]
    fn interim_results_can_be_suppressed() {
        let (sink, mut rx) = RecognitionSink::channel();
        sink.configure(&RecognitionConfig {
            interim_results: false,
            ..RecognitionConfig::default()
        });
        sink.open_session();
        sink.push_results(0, &[HostResult::interim("ehi")]);
        sink.push_results(0, &[HostResult::final_result("ehi tifa")]);
        assert_eq!(
            drain(&mut rx),
            vec![RecognitionEvent::Final {
                text: "ehi tifa".into()
            }]
        );
    }

    #[test]
    fn single_shot_session_ends_after_first_final() {
        let (sink, mut rx) = RecognitionSink::channel();
        sink.configure(&RecognitionConfig {
            continuous: false,
            ..RecognitionConfig::default()
        });
        sink.open_session();
        sink.push_results(
            0,
            &[HostResult::final_result("uno"), HostResult::final_result("due")],
        );
        sink.push_ended();
        assert!(!sink.is_session_open());
        assert_eq!(
            drain(&mut rx),
            vec![
                RecognitionEvent::Final { text: "uno".into() },
                RecognitionEvent::Ended
            ]
        );
    }
}
