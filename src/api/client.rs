use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Method, Response, Url};
use serde::Serialize;
use tracing::{debug, warn};

use super::auth::TokenManager;
use super::error::ApiError;
use crate::config::ClientConfig;
use crate::error::ClientError;

/// Retries after the first attempt, so at most `MAX_RETRIES + 1` requests.
pub const MAX_RETRIES: u32 = 3;
pub const INITIAL_RETRY_DELAY: Duration = Duration::from_millis(100);
pub const MAX_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Delay before retry number `attempt + 1`: `min(100ms * 2^attempt, 5s)`.
pub fn calculate_backoff(attempt: u32) -> Duration {
    let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
    INITIAL_RETRY_DELAY.saturating_mul(factor).min(MAX_RETRY_DELAY)
}

/// Authenticated client for the Grepr jobs API.
///
/// Cheap to clone; clones share the connection pool and the token cache,
/// so one instance can serve many concurrent operations.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    host: String,
    auth: Arc<TokenManager>,
    pub(crate) poll_interval: Duration,
}

impl Client {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(ClientError::HttpClient)?;

        let auth = TokenManager::new(
            http.clone(),
            config.token_endpoint(),
            config.client_id.clone(),
            config.client_secret.clone(),
        );

        Ok(Self {
            http,
            host: config.host.trim_end_matches('/').to_string(),
            auth: Arc::new(auth),
            poll_interval: config.poll_interval(),
        })
    }

    /// Token manager backing this client.
    pub fn auth(&self) -> &TokenManager {
        &self.auth
    }

    /// Sends an authenticated request to `host + path`, retrying transport
    /// failures and 5xx responses with exponential backoff.
    ///
    /// The body is serialized once and the same bytes are replayed on every
    /// attempt. Any response that is not retried is returned untouched, so
    /// the caller decides what its status means.
    pub(crate) async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Response, ClientError> {
        let payload = body
            .map(serde_json::to_vec)
            .transpose()
            .map_err(ClientError::Encode)?;

        let raw_url = format!("{}{}", self.host, path);
        let url = Url::parse(&raw_url)
            .map_err(|e| ClientError::InvalidUrl(format!("{raw_url}: {e}")))?;

        let mut last_error: Option<ApiError> = None;
        let mut attempt = 0;
        loop {
            // Fetched per attempt: a long retry sequence can outlive the token.
            let token = self.auth.token().await?;

            let mut request = self
                .http
                .request(method.clone(), url.clone())
                .bearer_auth(token)
                .header(CONTENT_TYPE, "application/json")
                .header(ACCEPT, "application/json");
            if let Some(bytes) = &payload {
                request = request.body(bytes.clone());
            }

            debug!(attempt = attempt + 1, %method, path, "sending request");
            let can_retry = attempt < MAX_RETRIES;

            match request.send().await {
                Err(err) if can_retry => {
                    let delay = calculate_backoff(attempt);
                    warn!(
                        attempt = attempt + 1,
                        %method,
                        path,
                        error = %err,
                        ?delay,
                        "request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => {
                    return Err(ClientError::Transport {
                        attempts: MAX_RETRIES + 1,
                        source: err,
                    });
                }
                Ok(response) if response.status().is_server_error() && can_retry => {
                    let status = response.status().as_u16();
                    let message = response.text().await.unwrap_or_default();
                    let delay = calculate_backoff(attempt);
                    warn!(
                        attempt = attempt + 1,
                        %method,
                        path,
                        status,
                        ?delay,
                        "server error, retrying"
                    );
                    last_error = Some(ApiError::new(status, message));
                    tokio::time::sleep(delay).await;
                }
                Ok(response) => {
                    if let Some(previous) = &last_error {
                        debug!(
                            attempts = attempt + 1,
                            status = response.status().as_u16(),
                            %previous,
                            "finished after retries"
                        );
                    }
                    return Ok(response);
                }
            }

            attempt += 1;
        }
    }
}
