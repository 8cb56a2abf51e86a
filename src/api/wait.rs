//! Polling loops that block until a job reaches some condition.
//!
//! Every loop shares one shape: the deadline is fixed once at entry and
//! checked at the top of each iteration, then the job is read, then the loop
//! sleeps for the client's poll interval. The caller's cancellation token is
//! observed during both the read and the sleep. A timeout too large to
//! represent as an instant (e.g. `Duration::MAX`) means no deadline.

use std::time::Duration;

use tokio::time::{Instant, sleep};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::client::Client;
use super::state::JobState;
use super::types::Job;
use crate::error::ClientError;

/// Outcome of inspecting one read.
enum Poll<T> {
    Done(T),
    Pending,
}

impl Client {
    /// Waits until the job is in `desired`.
    ///
    /// Fails early when the job settles in a different terminal state; the
    /// error carries the job. When `desired` is [`JobState::Deleted`], a 404
    /// counts as success and `Ok(None)` is returned.
    pub async fn wait_for_state(
        &self,
        id: &str,
        desired: JobState,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<Option<Job>, ClientError> {
        let waiting_for = format!("reach state {desired}");
        self.poll_job(id, timeout, cancel, waiting_for, |read| match read {
            Err(err) if desired == JobState::Deleted && err.is_not_found() => {
                Ok(Poll::Done(None))
            }
            Err(err) => Err(err),
            Ok(job) if job.state == desired => Ok(Poll::Done(Some(job))),
            Ok(job) if job.state.is_terminal() => Err(ClientError::TerminalState {
                id: id.to_string(),
                actual: job.state,
                desired,
                job: Box::new(job),
            }),
            Ok(_) => Ok(Poll::Pending),
        })
        .await
    }

    /// Waits until the job is running, stopped or terminal.
    pub async fn wait_for_stable_state(
        &self,
        id: &str,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<Job, ClientError> {
        self.poll_job(id, timeout, cancel, "reach a stable state".into(), |read| {
            let job = read?;
            if job.state.is_stable() {
                Ok(Poll::Done(job))
            } else {
                Ok(Poll::Pending)
            }
        })
        .await
    }

    /// Waits until the job reports `DELETED` or can no longer be found.
    pub async fn wait_for_deletion(
        &self,
        id: &str,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<(), ClientError> {
        self.poll_job(id, timeout, cancel, "be deleted".into(), |read| match read {
            Err(err) if err.is_not_found() => Ok(Poll::Done(())),
            Err(err) => Err(err),
            Ok(job) if job.state == JobState::Deleted => Ok(Poll::Done(())),
            Ok(_) => Ok(Poll::Pending),
        })
        .await
    }

    async fn poll_job<T, F>(
        &self,
        id: &str,
        timeout: Duration,
        cancel: &CancellationToken,
        waiting_for: String,
        mut inspect: F,
    ) -> Result<T, ClientError>
    where
        F: FnMut(Result<Job, ClientError>) -> Result<Poll<T>, ClientError>,
    {
        let deadline = Instant::now().checked_add(timeout);
        let mut polls = 0u32;

        loop {
            if deadline.is_some_and(|deadline| Instant::now() > deadline) {
                return Err(ClientError::Timeout {
                    id: id.to_string(),
                    waiting_for,
                });
            }

            let read = tokio::select! {
                _ = cancel.cancelled() => return Err(ClientError::Cancelled),
                read = self.get_job(id) => read,
            };
            polls += 1;

            if let Ok(job) = &read {
                debug!(job_id = id, state = %job.state, polls, "polled job");
            }
            if let Poll::Done(value) = inspect(read)? {
                return Ok(value);
            }

            tokio::select! {
                _ = cancel.cancelled() => return Err(ClientError::Cancelled),
                _ = sleep(self.poll_interval) => {}
            }
        }
    }
}
