use chat_completion::{CompletionError, ConversationClient};
use command_rules::CommandResolver;
use serde::Serialize;

/// Where a reply came from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum ReplySource {
    /// A local command rule, by name.
    Command(String),
    /// The remote conversation.
    Conversation,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Reply {
    pub text: String,
    pub source: ReplySource,
}

pub type DispatchOutcome = core::result::Result<Reply, CompletionError>;

/// Routes a captured utterance: local command rules first, the
/// conversation client otherwise.
pub struct Dispatcher {
    commands: CommandResolver,
    conversation: ConversationClient,
}

impl Dispatcher {
    pub fn new(commands: CommandResolver, conversation: ConversationClient) -> Self {
        let rules: Vec<&str> = commands.rule_names().collect();
        tracing::info!(?rules, "dispatcher ready");
        Self {
            commands,
            conversation,
        }
    }

    pub fn conversation(&self) -> &ConversationClient {
        &self.conversation
    }

    pub async fn dispatch(&self, utterance: &str) -> DispatchOutcome {
        if let Some(resolution) = self.commands.resolve(utterance) {
            return Ok(Reply {
                text: resolution.reply,
                source: ReplySource::Command(resolution.rule),
            });
        }
        let text = self.conversation.send(utterance).await?;
        Ok(Reply {
            text,
            source: ReplySource::Conversation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chat_completion::mock::MockBackend;
    use chat_completion::{CompletionSettings, Role};
    use std::sync::Arc;

    fn dispatcher(backend: MockBackend) -> Dispatcher {
        let conversation = ConversationClient::new(Arc::new(backend), CompletionSettings::default());
        Dispatcher::new(CommandResolver::with_builtins().unwrap(), conversation)
    }

    #[tokio::test]
    async fn command_match_skips_conversation() {
        let backend = MockBackend::new();
        let handle = backend.handle();
        let d = dispatcher(backend);

        let reply = d.dispatch("Accendi luci in cucina").await.unwrap();
        assert_eq!(reply.source, ReplySource::Command("lights_on".into()));
        assert!(handle.requests().is_empty());
        assert_eq!(d.conversation().history().await.len(), 1);
    }

    #[tokio::test]
    async fn unmatched_utterance_goes_to_conversation() {
        let backend = MockBackend::new();
        backend.push_reply("Sereno.");
        let d = dispatcher(backend);

        let reply = d.dispatch("che tempo fa domani").await.unwrap();
        assert_eq!(reply.text, "Sereno.");
        assert_eq!(reply.source, ReplySource::Conversation);

        let roles: Vec<_> = d
            .conversation()
            .history()
            .await
            .iter()
            .map(|t| t.role)
            .collect();
        assert_eq!(roles, [Role::System, Role::User, Role::Assistant]);
    }

    #[tokio::test]
    async fn conversation_failure_is_returned() {
        let backend = MockBackend::new();
        backend.push_error(CompletionError::Network("offline".into()));
        let d = dispatcher(backend);

        let err = d.dispatch("raccontami una storia").await.unwrap_err();
        assert!(matches!(err, CompletionError::Network(_)));
    }
}
