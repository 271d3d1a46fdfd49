use thiserror::Error;

/// Failure taxonomy for one response turn.
///
/// `Upstream` is fatal to the turn and propagates to the caller. `Search` and
/// `Argument` are recovered locally: the tool executor folds them into an
/// inline `{"error": ...}` result so the model can degrade gracefully.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("model backend error: {0}")]
    Upstream(String),
    #[error("search backend error: {0}")]
    Search(String),
    #[error("invalid tool arguments: {0}")]
    Argument(String),
}

impl From<anyhow::Error> for AgentError {
    fn from(value: anyhow::Error) -> Self {
        AgentError::Upstream(value.to_string())
    }
}

impl From<serde_json::Error> for AgentError {
    fn from(value: serde_json::Error) -> Self {
        AgentError::Argument(value.to_string())
    }
}
