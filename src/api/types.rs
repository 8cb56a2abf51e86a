//! Request and response bodies for the Grepr jobs API and the OAuth token endpoint.
//!
//! Job bodies use camelCase field names on the wire. The job graph is kept as
//! an opaque [`serde_json::Value`] so whatever the caller sends is passed
//! through verbatim, and whatever the server echoes back is exposed raw.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::state::{DesiredState, JobState};

/// A pipeline job as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: String,
    /// Incremented by the server on every update. Used for optimistic locking.
    pub version: i64,
    pub name: String,
    pub state: JobState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desired_state: Option<JobState>,
    /// Vertices and edges of the pipeline, untouched by this client.
    #[serde(default)]
    pub job_graph: serde_json::Value,
    #[serde(default)]
    pub organization_id: String,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    #[serde(default)]
    pub team_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// How the server executes a job. This client only creates asynchronous jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Execution {
    Asynchronous,
}

/// How the job processes data. This client only creates streaming jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Processing {
    Streaming,
}

/// Body of `POST /api/v1/jobs/async`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobRequest {
    pub name: String,
    execution: Execution,
    processing: Processing,
    pub job_graph: serde_json::Value,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub team_ids: Vec<String>,
}

impl CreateJobRequest {
    /// An asynchronous streaming job with no tags and no teams.
    pub fn new(name: impl Into<String>, job_graph: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            execution: Execution::Asynchronous,
            processing: Processing::Streaming,
            job_graph,
            tags: BTreeMap::new(),
            team_ids: Vec::new(),
        }
    }

    pub fn with_tags(mut self, tags: BTreeMap<String, String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_team_ids(mut self, team_ids: Vec<String>) -> Self {
        self.team_ids = team_ids;
        self
    }

    pub fn execution(&self) -> Execution {
        self.execution
    }

    pub fn processing(&self) -> Processing {
        self.processing
    }
}

/// Body of `PUT /api/v1/jobs/{id}`.
///
/// `from_version` must equal the server's current version of the job,
/// otherwise the server answers 409 Conflict.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateJobRequest {
    pub from_version: i64,
    pub desired_state: DesiredState,
    pub job_graph: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_ids: Option<Vec<String>>,
}

impl UpdateJobRequest {
    pub fn new(from_version: i64, desired_state: DesiredState, job_graph: serde_json::Value) -> Self {
        Self {
            from_version,
            desired_state,
            job_graph,
            team_ids: None,
        }
    }

    pub fn with_team_ids(mut self, team_ids: Vec<String>) -> Self {
        self.team_ids = Some(team_ids);
        self
    }
}

/// Collection wrapper returned by `GET /api/v1/jobs`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobsResponse {
    /// Absent and empty are treated the same.
    #[serde(default)]
    pub items: Option<Vec<Job>>,
}

impl JobsResponse {
    /// First item of the collection, if any.
    pub fn into_first(self) -> Option<Job> {
        self.items.and_then(|items| items.into_iter().next())
    }
}

/// Client-credentials grant sent to the identity provider.
#[derive(Debug, Clone, Serialize)]
pub struct OAuthTokenRequest<'a> {
    pub client_id: &'a str,
    pub client_secret: &'a str,
    pub audience: &'a str,
    pub grant_type: &'a str,
}

/// Identity provider answer to a client-credentials grant.
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthTokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    /// Lifetime of the token in seconds.
    pub expires_in: u64,
}
