//! HTTP backend for OpenAI-compatible chat-completions endpoints.

use crate::{BackendMetadata, CompletionBackend, CompletionError, CompletionRequest, Result};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_ERROR_BODY: usize = 512;

pub struct HttpBackend {
    client: reqwest::Client,
    endpoint: String,
    api_key: SecretString,
}

impl HttpBackend {
    pub fn new(endpoint: impl Into<String>, api_key: SecretString) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| CompletionError::Unavailable(format!("http client: {e}")))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key,
        })
    }

    /// Use a preconfigured client (proxy, TLS roots, timeouts).
    pub fn with_client(
        client: reqwest::Client,
        endpoint: impl Into<String>,
        api_key: SecretString,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            api_key,
        }
    }
}

#[async_trait]
impl CompletionBackend for HttpBackend {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let start = std::time::Instant::now();
        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.api_key.expose_secret())
            .json(request)
            .send()
            .await
            .map_err(|e| CompletionError::Network(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| CompletionError::Network(e.to_string()))?;
        tracing::debug!(
            status = status.as_u16(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "completion response received"
        );

        if !status.is_success() {
            let mut body = body;
            if body.len() > MAX_ERROR_BODY {
                let mut cut = MAX_ERROR_BODY;
                while !body.is_char_boundary(cut) {
                    cut -= 1;
                }
                body.truncate(cut);
            }
            return Err(CompletionError::Api {
                status: status.as_u16(),
                body,
            });
        }
        parse_reply(&body)
    }

    fn metadata(&self) -> BackendMetadata {
        BackendMetadata {
            name: "openai-http".to_string(),
            endpoint: Some(self.endpoint.clone()),
        }
    }
}

#[derive(serde::Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

#[derive(serde::Deserialize)]
struct ReplyChoice {
    message: ReplyMessage,
}

#[derive(serde::Deserialize)]
struct ReplyBody {
    choices: Vec<ReplyChoice>,
}

/// Extract `choices[0].message.content` from a response body.
pub fn parse_reply(body: &str) -> Result<String> {
    let parsed: ReplyBody =
        serde_json::from_str(body).map_err(|e| CompletionError::Malformed(e.to_string()))?;
    parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| CompletionError::Malformed("no choices".into()))?
        .message
        .content
        .ok_or_else(|| CompletionError::Malformed("choice without content".into()))
}
