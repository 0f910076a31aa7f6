use thiserror::Error;

pub type Result<T, E = RuleError> = core::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("invalid trigger pattern for rule '{name}': {source}")]
    InvalidPattern {
        name: String,
        #[source]
        source: regex::Error,
    },
    #[error("duplicate rule name: {0}")]
    DuplicateName(String),
}
