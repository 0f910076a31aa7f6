#[cfg(feature = "console")]
use crate::{ConsoleSynthesizer, StdinRecognizer};
#[cfg(feature = "mock")]
use crate::{MockRecognizer, MockSynthesizer};
use crate::{RecognitionConfig, RecognitionSink, Recognizer, Result, Synthesizer, UnavailableRecognizer};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum RecognizerKind {
    Mock,
    Stdin,
    /// Host without recognition: every `start()` fails fatally.
    Unavailable,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SynthesizerKind {
    Mock,
    Console,
    /// Host without synthesis: replies are shown but not spoken.
    Unavailable,
}

pub fn new_recognizer(
    kind: RecognizerKind,
    config: &RecognitionConfig,
    sink: RecognitionSink,
) -> Result<Box<dyn Recognizer>> {
    sink.configure(config);
    match kind {
        RecognizerKind::Mock => {
            #[cfg(feature = "mock")]
            {
                Ok(Box::new(MockRecognizer::new(sink)))
            }
            #[cfg(not(feature = "mock"))]
            {
                let _ = (config, sink);
                Err(crate::SpeechError::Backend("mock feature not enabled".into()))
            }
        }
        RecognizerKind::Stdin => {
            #[cfg(feature = "console")]
            {
                Ok(Box::new(StdinRecognizer::new(config, sink)))
            }
            #[cfg(not(feature = "console"))]
            {
                let _ = (config, sink);
                Err(crate::SpeechError::Backend("console feature not enabled".into()))
            }
        }
        RecognizerKind::Unavailable => {
            let _ = (config, sink);
            Ok(Box::new(UnavailableRecognizer))
        }
    }
}

/// `Ok(None)` means the host has no synthesis capability.
pub fn new_synthesizer(kind: SynthesizerKind) -> Result<Option<Box<dyn Synthesizer>>> {
    match kind {
        SynthesizerKind::Mock => {
            #[cfg(feature = "mock")]
            {
                Ok(Some(Box::new(MockSynthesizer::new())))
            }
            #[cfg(not(feature = "mock"))]
            {
                Err(crate::SpeechError::Backend("mock feature not enabled".into()))
            }
        }
        SynthesizerKind::Console => {
            #[cfg(feature = "console")]
            {
                Ok(Some(Box::new(ConsoleSynthesizer)))
            }
            #[cfg(not(feature = "console"))]
            {
                Err(crate::SpeechError::Backend("console feature not enabled".into()))
            }
        }
        SynthesizerKind::Unavailable => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_recognizer_fails_on_start() {
        let (sink, _rx) = RecognitionSink::channel();
        let mut rec =
            new_recognizer(RecognizerKind::Unavailable, &RecognitionConfig::default(), sink).unwrap();
        let err = rec.start().unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn unavailable_synthesizer_is_none() {
        assert!(new_synthesizer(SynthesizerKind::Unavailable).unwrap().is_none());
    }

    #[cfg(feature = "mock")]
    #[test]
    fn recognizer_factory_applies_recognition_mode() {
        let (sink, mut rx) = RecognitionSink::channel();
        let config = RecognitionConfig {
            interim_results: false,
            ..RecognitionConfig::default()
        };
        let mut rec = new_recognizer(RecognizerKind::Mock, &config, sink.clone()).unwrap();
        rec.start().unwrap();
        sink.push_results(0, &[crate::HostResult::interim("ti")]);
        assert!(rx.try_recv().is_err());
    }
}
