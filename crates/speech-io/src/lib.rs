//! speech-io: recognition and synthesis adapters
//!
//! Host speech capabilities are consumed through two narrow traits,
//! [`Recognizer`] and [`Synthesizer`]. Recognition backends never call into
//! the assistant directly: they push host results into a [`RecognitionSink`],
//! which normalises them into [`RecognitionEvent`]s on a single queue.
//! The default build enables `mock` and `console` backends so binaries run on
//! any host.

mod types;
pub use types::{HostResult, RecognitionConfig, RecognitionEvent, SynthesisConfig};

mod error;
pub use error::{Result, SpeechError};

mod sink;
pub use sink::RecognitionSink;

mod traits;
pub use traits::{Recognizer, Synthesizer};

mod output;
pub use output::{SpeakOutcome, SpeechOutput};

mod unavailable;
pub use unavailable::UnavailableRecognizer;

#[cfg(feature = "mock")]
mod mock;
#[cfg(feature = "mock")]
pub use mock::{MockRecognizer, MockRecognizerHandle, MockSynthesizer, MockSynthesizerHandle};

#[cfg(feature = "console")]
mod console;
#[cfg(feature = "console")]
pub use console::{ConsoleSynthesizer, StdinRecognizer};

pub mod plugin;
