use thiserror::Error;
use truthlens_llm::LlmError;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Model call failed: {0}")]
    Llm(LlmError),

    #[error("Could not interpret analysis result: {0}")]
    Parse(String),

    #[error("Cache error: {0}")]
    Cache(String),
}

impl From<LlmError> for PipelineError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::MalformedResponse(msg) => PipelineError::Parse(msg),
            LlmError::Serde(err) => PipelineError::Parse(err.to_string()),
            other => PipelineError::Llm(other),
        }
    }
}

impl PipelineError {
    /// Message suitable for showing to an end user.
    pub fn user_message(&self) -> String {
        match self {
            PipelineError::InvalidInput(msg) => msg.clone(),
            PipelineError::Llm(LlmError::RateLimitExceeded) => {
                "The analysis service is busy. Please try again shortly.".to_string()
            }
            _ => "The analysis engine could not determine the content of this link. \
                  Check that the URL is correct or try again later."
                .to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
