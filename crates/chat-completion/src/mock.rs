//! Scripted completion backend for development and testing

use crate::{BackendMetadata, CompletionBackend, CompletionError, CompletionRequest, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

#[derive(Default)]
struct Script {
    outcomes: VecDeque<Result<String>>,
    requests: Vec<CompletionRequest>,
}

/// Answers from a queue of scripted outcomes. When the queue is empty it
/// echoes the last user turn.
///
/// A gated backend holds every request until [`MockBackendHandle::release`]
/// lets it through, which lets tests control completion ordering.
pub struct MockBackend {
    script: Arc<Mutex<Script>>,
    gate: Option<Arc<Semaphore>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            script: Arc::new(Mutex::new(Script::default())),
            gate: None,
        }
    }

    pub fn gated() -> Self {
        Self {
            gate: Some(Arc::new(Semaphore::new(0))),
            ..Self::new()
        }
    }

    pub fn push_reply(&self, reply: impl Into<String>) {
        if let Ok(mut script) = self.script.lock() {
            script.outcomes.push_back(Ok(reply.into()));
        }
    }

    pub fn push_error(&self, error: CompletionError) {
        if let Ok(mut script) = self.script.lock() {
            script.outcomes.push_back(Err(error));
        }
    }

    pub fn handle(&self) -> MockBackendHandle {
        MockBackendHandle {
            script: self.script.clone(),
            gate: self.gate.clone(),
        }
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompletionBackend for MockBackend {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        if let Ok(mut script) = self.script.lock() {
            script.requests.push(request.clone());
        }

        if let Some(gate) = &self.gate {
            let permit = gate
                .acquire()
                .await
                .map_err(|_| CompletionError::Unavailable("mock gate closed".into()))?;
            permit.forget();
        }

        let scripted = self
            .script
            .lock()
            .map_err(|_| CompletionError::Unavailable("mock script poisoned".into()))?
            .outcomes
            .pop_front();
        match scripted {
            Some(outcome) => outcome,
            None => {
                let last = request
                    .messages
                    .last()
                    .map(|t| t.content.clone())
                    .unwrap_or_default();
                Ok(format!("Hai detto: {last}"))
            }
        }
    }

    fn metadata(&self) -> BackendMetadata {
        BackendMetadata {
            name: "mock".to_string(),
            endpoint: None,
        }
    }
}

#[derive(Clone)]
pub struct MockBackendHandle {
    script: Arc<Mutex<Script>>,
    gate: Option<Arc<Semaphore>>,
}

impl MockBackendHandle {
    /// Requests received so far, in arrival order.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.script
            .lock()
            .map(|s| s.requests.clone())
            .unwrap_or_default()
    }

    /// Let `n` held requests complete. No-op for ungated backends.
    pub fn release(&self, n: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(n);
        }
    }
}
