use crate::{BackendMetadata, CompletionRequest, Result};
use async_trait::async_trait;

/// A chat-completion service.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Issue one request and return the assistant reply text.
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;

    fn metadata(&self) -> BackendMetadata;
}
