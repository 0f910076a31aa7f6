use crate::{Result, RuleError};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Produces the reply for a matched rule. Must be local and synchronous.
pub type Responder = Box<dyn Fn() -> String + Send + Sync>;

pub struct CommandRule {
    name: String,
    trigger: Regex,
    responder: Responder,
}

impl CommandRule {
    /// Build a rule whose trigger is matched case-insensitively anywhere in
    /// the utterance.
    pub fn new<F>(name: impl Into<String>, pattern: &str, responder: F) -> Result<Self>
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        let name = name.into();
        let trigger = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|source| RuleError::InvalidPattern {
                name: name.clone(),
                source,
            })?;
        Ok(Self {
            name,
            trigger,
            responder: Box::new(responder),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn matches(&self, text: &str) -> bool {
        self.trigger.is_match(text)
    }

    pub fn respond(&self) -> String {
        (self.responder)()
    }
}

impl std::fmt::Debug for CommandRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRule")
            .field("name", &self.name)
            .field("trigger", &self.trigger.as_str())
            .finish_non_exhaustive()
    }
}

/// Configuration form of a rule with a fixed reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticRule {
    pub name: String,
    pub pattern: String,
    pub reply: String,
}

impl StaticRule {
    pub fn into_rule(self) -> Result<CommandRule> {
        let reply = self.reply;
        CommandRule::new(self.name, &self.pattern, move || reply.clone())
    }
}

/// Spoken form of the wall-clock time, e.g. "Sono le 09:05:00."
pub fn clock_reply(now: OffsetDateTime) -> String {
    format!(
        "Sono le {:02}:{:02}:{:02}.",
        now.hour(),
        now.minute(),
        now.second()
    )
}

fn local_now() -> OffsetDateTime {
    // Local offset lookup can fail on multi-threaded hosts
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

/// The built-in Italian command set, in precedence order.
pub fn builtin_rules() -> Result<Vec<CommandRule>> {
    Ok(vec![
        CommandRule::new("lights_on", "accendi luci", || {
            "Sto accendendo le luci (simulazione).".to_string()
        })?,
        CommandRule::new("clock", "che ore sono", || clock_reply(local_now()))?,
        CommandRule::new("lights_off", "spegnere luci", || {
            "Luci spente (simulazione).".to_string()
        })?,
    ])
}
