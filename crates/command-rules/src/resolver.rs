use crate::{builtin_rules, CommandRule, Result, RuleError, StaticRule};
use std::collections::HashSet;

/// Outcome of a local command match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub rule: String,
    pub reply: String,
}

/// Ordered rule list; evaluated in declaration order, first match wins.
#[derive(Debug)]
pub struct CommandResolver {
    rules: Vec<CommandRule>,
}

impl CommandResolver {
    pub fn new(rules: Vec<CommandRule>) -> Result<Self> {
        let mut seen = HashSet::new();
        for rule in &rules {
            if !seen.insert(rule.name()) {
                return Err(RuleError::DuplicateName(rule.name().to_string()));
            }
        }
        Ok(Self { rules })
    }

    pub fn builder() -> CommandResolverBuilder {
        CommandResolverBuilder::default()
    }

    pub fn with_builtins() -> Result<Self> {
        Self::new(builtin_rules()?)
    }

    /// Returns the first matching rule's reply, or `None` when the utterance
    /// should go to the conversation service.
    pub fn resolve(&self, text: &str) -> Option<Resolution> {
        let rule = self.rules.iter().find(|rule| rule.matches(text))?;
        let reply = rule.respond();
        tracing::info!(rule = rule.name(), "local command matched");
        Some(Resolution {
            rule: rule.name().to_string(),
            reply,
        })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rule_names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(CommandRule::name)
    }
}

#[derive(Debug, Default)]
pub struct CommandResolverBuilder {
    rules: Vec<CommandRule>,
}

impl CommandResolverBuilder {
    pub fn rule<F>(mut self, name: &str, pattern: &str, responder: F) -> Result<Self>
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        self.rules.push(CommandRule::new(name, pattern, responder)?);
        Ok(self)
    }

    pub fn builtins(mut self) -> Result<Self> {
        self.rules.extend(builtin_rules()?);
        Ok(self)
    }

    pub fn static_rules(mut self, rules: impl IntoIterator<Item = StaticRule>) -> Result<Self> {
        for rule in rules {
            self.rules.push(rule.into_rule()?);
        }
        Ok(self)
    }

    pub fn build(self) -> Result<CommandResolver> {
        CommandResolver::new(self.rules)
    }
}
