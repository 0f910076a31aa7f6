use crate::{HostResult, RecognitionSink, Recognizer, Result, SpeechError, Synthesizer};
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct RecognizerLog {
    starts: usize,
    stops: usize,
    active: bool,
    next_index: usize,
    fail_start: bool,
}

/// In-process recognizer driven by a [`MockRecognizerHandle`].
///
/// `stop()` ends the session immediately, as a host would after flushing.
pub struct MockRecognizer {
    handle: MockRecognizerHandle,
}

impl MockRecognizer {
    pub fn new(sink: RecognitionSink) -> Self {
        Self {
            handle: MockRecognizerHandle {
                log: Arc::new(Mutex::new(RecognizerLog::default())),
                sink,
            },
        }
    }

    pub fn handle(&self) -> MockRecognizerHandle {
        self.handle.clone()
    }
}

impl Recognizer for MockRecognizer {
    fn start(&mut self) -> Result<()> {
        let mut log = self
            .handle
            .log
            .lock()
            .map_err(|_| SpeechError::Backend("mock log poisoned".into()))?;
        if log.fail_start {
            return Err(SpeechError::Unsupported("mock recognition disabled"));
        }
        log.starts += 1;
        log.active = true;
        log.next_index = 0;
        self.handle.sink.open_session();
        Ok(())
    }

    fn stop(&mut self) {
        if let Ok(mut log) = self.handle.log.lock() {
            log.stops += 1;
            log.active = false;
        }
        self.handle.sink.push_ended();
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

/// Test-side view of a [`MockRecognizer`]: inspects start/stop calls and
/// plays the host by injecting results.
#[derive(Clone)]
pub struct MockRecognizerHandle {
    log: Arc<Mutex<RecognizerLog>>,
    sink: RecognitionSink,
}

impl MockRecognizerHandle {
    pub fn starts(&self) -> usize {
        self.log.lock().map(|l| l.starts).unwrap_or(0)
    }

    pub fn stops(&self) -> usize {
        self.log.lock().map(|l| l.stops).unwrap_or(0)
    }

    pub fn is_active(&self) -> bool {
        self.log.lock().map(|l| l.active).unwrap_or(false)
    }

    /// Make every following `start()` fail as if the host lacked recognition.
    pub fn disable(&self) {
        if let Ok(mut log) = self.log.lock() {
            log.fail_start = true;
        }
    }

    pub fn partial(&self, text: &str) {
        let index = self.log.lock().map(|l| l.next_index).unwrap_or(0);
        self.sink.push_results(index, &[HostResult::interim(text)]);
    }

    pub fn final_text(&self, text: &str) {
        let index = match self.log.lock() {
            Ok(mut log) => {
                let index = log.next_index;
                log.next_index += 1;
                index
            }
            Err(_) => return,
        };
        self.sink.push_results(index, &[HostResult::final_result(text)]);
    }

    pub fn error(&self, code: &str) {
        self.sink.push_error(code);
    }

    /// Host-driven end of session (e.g. silence timeout), without `stop()`.
    pub fn end(&self) {
        if let Ok(mut log) = self.log.lock() {
            log.active = false;
        }
        self.sink.push_ended();
    }
}

type SpokenLog = Arc<Mutex<Vec<(String, String)>>>;

/// Synthesizer that records what it was asked to say.
pub struct MockSynthesizer {
    spoken: SpokenLog,
    fail: bool,
}

impl MockSynthesizer {
    pub fn new() -> Self {
        Self {
            spoken: Arc::new(Mutex::new(Vec::new())),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn handle(&self) -> MockSynthesizerHandle {
        MockSynthesizerHandle {
            spoken: self.spoken.clone(),
        }
    }
}

impl Default for MockSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Synthesizer for MockSynthesizer {
    fn speak(&mut self, text: &str, language: &str) -> Result<()> {
        if self.fail {
            return Err(SpeechError::Backend("mock synthesis failure".into()));
        }
        if let Ok(mut spoken) = self.spoken.lock() {
            spoken.push((text.to_string(), language.to_string()));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

#[derive(Clone)]
pub struct MockSynthesizerHandle {
    spoken: SpokenLog,
}

impl MockSynthesizerHandle {
    /// `(text, language)` pairs in request order.
    pub fn spoken(&self) -> Vec<(String, String)> {
        self.spoken.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RecognitionEvent;

    #[test]
    fn start_stop_cycle_reports_single_end() {
        let (sink, mut rx) = RecognitionSink::channel();
        let mut rec = MockRecognizer::new(sink);
        let handle = rec.handle();

        rec.start().unwrap();
        handle.final_text("ehi tifa");
        rec.stop();
        rec.stop();

        assert_eq!(handle.starts(), 1);
        assert_eq!(handle.stops(), 2);
        assert!(!handle.is_active());
        assert_eq!(
            rx.try_recv().unwrap(),
            RecognitionEvent::Final {
                text: "ehi tifa".into()
            }
        );
        assert_eq!(rx.try_recv().unwrap(), RecognitionEvent::Ended);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn disabled_recognizer_fails_fatally() {
        let (sink, _rx) = RecognitionSink::channel();
        let mut rec = MockRecognizer::new(sink);
        rec.handle().disable();
        let err = rec.start().unwrap_err();
        assert!(err.is_fatal());
    }
}
