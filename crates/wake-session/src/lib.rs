//! wake-session: the listening loop of the assistant
//!
//! [`WakeWordStateMachine`] is a synchronous event sink. It consumes
//! recognition events and dispatch completions, replaces its
//! [`SessionState`] on every transition and answers with [`Effect`]s for the
//! host to carry out. [`AssistantRuntime`] is that host: it owns the
//! recognizer, the speech output and the [`Dispatcher`], serialises all
//! inputs onto one task and publishes state snapshots to subscribers.

mod error;
pub use error::{Result, SessionError};

mod phase;
pub use phase::ListeningPhase;

mod state;
pub use state::SessionState;

pub mod status;

mod effect;
pub use effect::Effect;

mod machine;
pub use machine::{SessionConfig, WakeWordStateMachine};

mod dispatch;
pub use dispatch::{DispatchOutcome, Dispatcher, Reply, ReplySource};

mod runtime;
pub use runtime::AssistantRuntime;
