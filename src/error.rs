use thiserror::Error;

use crate::api::{ApiError, Job, JobState};

pub type Result<T, E = ClientError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The identity provider answered with a non-200 status. The body is
    /// dropped since it may echo credentials.
    #[error("failed to fetch token: status {status}")]
    TokenStatus { status: u16 },

    #[error("failed to fetch token: {0}")]
    TokenRequest(#[source] reqwest::Error),

    #[error("failed to decode token response: {0}")]
    TokenDecode(#[source] reqwest::Error),

    #[error("request failed after {attempts} attempts: {source}")]
    Transport {
        attempts: u32,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to marshal request body: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to decode response: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("failed to read response body: {0}")]
    ReadBody(#[source] reqwest::Error),

    #[error("invalid request URL: {0}")]
    InvalidUrl(String),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error("timeout waiting for job {id} to {waiting_for}")]
    Timeout { id: String, waiting_for: String },

    /// The job settled in a terminal state other than the one waited for.
    /// Carries the last observed job.
    #[error("job {id} reached terminal state {actual} instead of {desired}")]
    TerminalState {
        id: String,
        actual: JobState,
        desired: JobState,
        job: Box<Job>,
    },

    #[error("operation cancelled")]
    Cancelled,
}

impl ClientError {
    /// The classified API error, if this error came from an HTTP error response.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            ClientError::Api(e) => Some(e),
            _ => None,
        }
    }

    /// HTTP status behind this error, for API and token-endpoint failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api(e) => Some(e.status),
            ClientError::TokenStatus { status } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.api_error().is_some_and(ApiError::is_not_found)
    }

    pub fn is_conflict(&self) -> bool {
        self.api_error().is_some_and(ApiError::is_conflict)
    }

    pub fn is_retryable(&self) -> bool {
        self.api_error().is_some_and(ApiError::is_retryable)
    }
}
