use thiserror::Error;

pub type Result<T, E = CompletionError> = core::result::Result<T, E>;

#[derive(Debug, Clone, Error)]
pub enum CompletionError {
    /// Transport failure: DNS, connect, TLS, timeout, body read.
    #[error("network error: {0}")]
    Network(String),
    /// The service answered with a non-2xx status.
    #[error("API error: HTTP {status}")]
    Api { status: u16, body: String },
    /// 2xx answer without a usable `choices[0].message.content`.
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("backend not available: {0}")]
    Unavailable(String),
}
