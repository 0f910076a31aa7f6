//! Line-oriented host backends: typed lines stand in for final transcripts,
//! replies are printed instead of played.

use crate::{HostResult, RecognitionConfig, RecognitionSink, Recognizer, Result, SpeechError, Synthesizer};
use std::io::{BufRead, Write};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

#[derive(Default)]
struct StdinState {
    next_index: AtomicUsize,
    exhausted: AtomicBool,
}

/// Treats every non-empty stdin line as a final result. Lines typed while the
/// session is stopped are dropped, like speech outside a host session.
pub struct StdinRecognizer {
    sink: RecognitionSink,
    state: Arc<StdinState>,
    reader: Option<thread::JoinHandle<()>>,
}

impl StdinRecognizer {
    pub fn new(config: &RecognitionConfig, sink: RecognitionSink) -> Self {
        tracing::debug!(language = %config.language, "stdin recognizer ready");
        Self {
            sink,
            state: Arc::new(StdinState::default()),
            reader: None,
        }
    }

    fn spawn_reader(&self) -> Result<thread::JoinHandle<()>> {
        let sink = self.sink.clone();
        let state = self.state.clone();
        thread::Builder::new()
            .name("stdin-recognizer".into())
            .spawn(move || {
                let stdin = std::io::stdin();
                for line in stdin.lock().lines() {
                    match line {
                        Ok(line) => {
                            let text = line.trim();
                            if text.is_empty() {
                                continue;
                            }
                            let index = state.next_index.fetch_add(1, Ordering::SeqCst);
                            sink.push_results(index, &[HostResult::final_result(text)]);
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "stdin read failed");
                            sink.push_error("audio-capture");
                            break;
                        }
                    }
                }
                tracing::info!("stdin closed");
                state.exhausted.store(true, Ordering::SeqCst);
                sink.push_ended();
            })
            .map_err(|e| SpeechError::Backend(format!("spawn stdin reader: {e}")))
    }
}

impl Recognizer for StdinRecognizer {
    fn start(&mut self) -> Result<()> {
        if self.state.exhausted.load(Ordering::SeqCst) {
            return Err(SpeechError::Unsupported("stdin input closed"));
        }
        self.state.next_index.store(0, Ordering::SeqCst);
        self.sink.open_session();
        if self.reader.is_none() {
            self.reader = Some(self.spawn_reader()?);
        }
        Ok(())
    }

    fn stop(&mut self) {
        self.sink.push_ended();
    }

    fn name(&self) -> &'static str {
        "stdin"
    }
}

/// Prints replies to stdout.
#[derive(Debug, Default)]
pub struct ConsoleSynthesizer;

impl Synthesizer for ConsoleSynthesizer {
    fn speak(&mut self, text: &str, language: &str) -> Result<()> {
        let mut out = std::io::stdout().lock();
        writeln!(out, "🔊 [{language}] {text}").map_err(|e| SpeechError::Backend(e.to_string()))
    }

    fn name(&self) -> &'static str {
        "console"
    }
}
