use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("provider request failed: {0}")]
    Transport(String),

    #[error("provider returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("provider timed out: {0}")]
    Timeout(String),

    #[error("stream ended without content or terminal marker")]
    IncompleteStream,

    #[error("response parsing failed: {0}")]
    ResponseParse(String),

    #[error("response did not conform to expected schema: {0}")]
    SchemaViolation(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LlmError::Timeout(e.to_string())
        } else {
            LlmError::Transport(e.to_string())
        }
    }
}
