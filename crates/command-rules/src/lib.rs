//! Local voice commands
//!
//! A finalized utterance is matched against an ordered list of
//! pattern -> responder rules. The first matching rule produces the reply;
//! no match tells the caller to fall through to the conversation service.

mod error;
mod resolver;
mod rules;

pub use error::{Result, RuleError};
pub use resolver::{CommandResolver, CommandResolverBuilder, Resolution};
pub use rules::{builtin_rules, clock_reply, CommandRule, Responder, StaticRule};
