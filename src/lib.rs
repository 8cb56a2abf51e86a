//! # grepr-client
//!
//! Authenticated client for the Grepr asynchronous pipeline job API.
//!
//! - OAuth2 client-credentials tokens, cached and refreshed a minute before expiry
//! - Requests retried on transport failures and 5xx with exponential backoff
//! - Typed API errors with not-found / conflict / retryable predicates
//! - Create, read, update (optimistically locked) and delete of jobs
//! - Polling waits for a target state, a stable state or deletion
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//!
//! use grepr_client::{Client, ClientConfig, CreateJobRequest, JobState};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() -> Result<(), grepr_client::ClientError> {
//! let client = Client::new(ClientConfig::new(
//!     "https://myorg.app.grepr.ai",
//!     "client-id",
//!     "client-secret",
//! ))?;
//!
//! let graph = serde_json::json!({"vertices": [], "edges": []});
//! let job = client
//!     .create_async_job(&CreateJobRequest::new("logs", graph))
//!     .await?;
//!
//! let cancel = CancellationToken::new();
//! client
//!     .wait_for_state(&job.id, JobState::Running, Duration::from_secs(300), &cancel)
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod error;

pub use api::{
    ApiError, Client, CreateJobRequest, DesiredState, Job, JobState, TokenManager,
    UpdateJobRequest,
};
pub use config::{ClientConfig, DEFAULT_AUTH0_DOMAIN};
pub use error::{ClientError, Result};
