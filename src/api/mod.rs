pub mod auth;
pub mod client;
pub mod endpoints;
pub mod error;
pub mod jobs;
pub mod state;
pub mod types;
pub mod wait;

#[cfg(test)]
pub(crate) mod test_support;

pub use auth::{TOKEN_REFRESH_BUFFER, TokenManager};
pub use client::{Client, MAX_RETRIES, calculate_backoff};
pub use error::ApiError;
pub use state::{DesiredState, JobState};
pub use types::{
    CreateJobRequest, Execution, Job, JobsResponse, OAuthTokenResponse, Processing,
    UpdateJobRequest,
};
