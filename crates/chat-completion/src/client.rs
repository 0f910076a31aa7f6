use crate::{
    CompletionBackend, CompletionRequest, CompletionSettings, ConversationHistory,
    ConversationTurn, Result,
};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Conversation with the remote completion service.
///
/// The user turn is recorded before the request is issued, so a failed
/// request still leaves the question in history. Only a successful reply
/// appends an assistant turn. Sends are serialised on the history lock.
pub struct ConversationClient {
    backend: Arc<dyn CompletionBackend>,
    settings: CompletionSettings,
    history: Mutex<ConversationHistory>,
}

impl ConversationClient {
    pub fn new(backend: Arc<dyn CompletionBackend>, settings: CompletionSettings) -> Self {
        let history = ConversationHistory::new(&settings.system_prompt, settings.history_window);
        let meta = backend.metadata();
        tracing::info!(backend = %meta.name, model = %settings.model, "conversation client ready");
        Self {
            backend,
            settings,
            history: Mutex::new(history),
        }
    }

    /// Send one user utterance. No retry is attempted on failure.
    pub async fn send(&self, user_text: &str) -> Result<String> {
        let mut history = self.history.lock().await;
        history.push_user(user_text);

        let request = CompletionRequest {
            model: self.settings.model.clone(),
            messages: history.turns().to_vec(),
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
        };
        tracing::debug!(turns = request.messages.len(), "sending completion request");

        match self.backend.complete(&request).await {
            Ok(reply) => {
                history.push_assistant(reply.clone());
                Ok(reply)
            }
            Err(e) => {
                tracing::warn!(error = %e, "completion request failed");
                Err(e)
            }
        }
    }

    /// Snapshot of the current history, system turn first.
    pub async fn history(&self) -> Vec<ConversationTurn> {
        self.history.lock().await.turns().to_vec()
    }
}
