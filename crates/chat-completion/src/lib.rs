//! chat-completion: remote conversational fallback
//!
//! [`ConversationClient`] owns the ordered turn history and forwards it to a
//! [`CompletionBackend`]. The `http` backend speaks the OpenAI-compatible
//! chat-completions protocol; the `mock` backend is scripted for tests.

mod types;
pub use types::{BackendMetadata, CompletionRequest, CompletionSettings, ConversationTurn, Role};

mod error;
pub use error::{CompletionError, Result};

mod traits;
pub use traits::CompletionBackend;

mod history;
pub use history::ConversationHistory;

mod client;
pub use client::ConversationClient;

#[cfg(feature = "mock")]
pub mod mock;

#[cfg(feature = "http")]
pub mod http;

pub use secrecy::SecretString;
