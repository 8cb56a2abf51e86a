use reqwest::Method;
use tracing::{debug, info};

use super::client::Client;
use super::endpoints;
use super::error::{check_response, handle_optional_response, handle_response};
use super::types::{CreateJobRequest, Job, JobsResponse, UpdateJobRequest};
use crate::error::ClientError;

impl Client {
    /// Creates an asynchronous streaming job.
    ///
    /// The job starts in `CREATED` and moves on by itself; use
    /// [`wait_for_state`](Client::wait_for_state) or
    /// [`wait_for_stable_state`](Client::wait_for_stable_state) to follow it.
    pub async fn create_async_job(&self, req: &CreateJobRequest) -> Result<Job, ClientError> {
        let response = self
            .send(Method::POST, endpoints::JOBS_ASYNC, Some(req))
            .await?;
        let job: Job = handle_response(response).await?;
        info!(job_id = %job.id, name = %job.name, state = %job.state, "job created");
        Ok(job)
    }

    /// Reads a job by id. A missing job surfaces as an error whose
    /// [`is_not_found`](ClientError::is_not_found) is true.
    pub async fn get_job(&self, id: &str) -> Result<Job, ClientError> {
        let response = self
            .send::<()>(Method::GET, &endpoints::job(id), None)
            .await?;
        handle_response(response).await
    }

    /// Looks a job up by exact name.
    ///
    /// Returns `Ok(None)` when no job has that name; absence is not an error.
    pub async fn get_job_by_name(&self, name: &str) -> Result<Option<Job>, ClientError> {
        let response = self
            .send::<()>(Method::GET, &endpoints::jobs_by_name(name), None)
            .await?;
        let jobs: Option<JobsResponse> = handle_optional_response(response).await?;
        let job = jobs.and_then(JobsResponse::into_first);
        debug!(name, found = job.is_some(), "looked up job by name");
        Ok(job)
    }

    /// Updates a job, guarded by `req.from_version`.
    ///
    /// A stale version yields a 409 ([`is_conflict`](ClientError::is_conflict));
    /// re-read the job and try again. With `rollback_enabled` the server
    /// reverts to the previous version if the update fails to apply.
    pub async fn update_job(
        &self,
        id: &str,
        req: &UpdateJobRequest,
        rollback_enabled: bool,
    ) -> Result<Job, ClientError> {
        let response = self
            .send(Method::PUT, &endpoints::job_update(id, rollback_enabled), Some(req))
            .await?;
        let job: Job = handle_response(response).await?;
        info!(job_id = %job.id, version = job.version, "job updated");
        Ok(job)
    }

    /// Deletes a job. The server usually answers 202 with no body.
    pub async fn delete_job(&self, id: &str) -> Result<(), ClientError> {
        let response = self
            .send::<()>(Method::DELETE, &endpoints::job(id), None)
            .await?;
        check_response(response).await?;
        info!(job_id = id, "job deletion requested");
        Ok(())
    }
}
