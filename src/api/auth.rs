//! OAuth2 client-credentials token acquisition and caching.
//!
//! The cached token is shared by every request made through one client.
//! Reads of a still-valid token take the shared lock only. A refresh takes
//! the exclusive lock, re-checks validity and only then calls the identity
//! provider, so concurrent callers that all observe a stale token trigger
//! a single refresh.

use std::time::Duration;

use reqwest::StatusCode;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, warn};

use super::types::{OAuthTokenRequest, OAuthTokenResponse};
use crate::error::ClientError;

/// A token is refreshed this long before it actually expires.
pub const TOKEN_REFRESH_BUFFER: Duration = Duration::from_secs(60);

/// Upper bound on the lifetime trusted from a token response.
const MAX_TOKEN_LIFETIME: Duration = Duration::from_secs(365 * 24 * 60 * 60);

const AUDIENCE: &str = "service";
const GRANT_TYPE: &str = "client_credentials";

#[derive(Clone)]
struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

impl CachedToken {
    /// An empty token is never fresh, so the next call asks again.
    fn is_fresh(&self, now: Instant) -> bool {
        !self.access_token.is_empty() && now + TOKEN_REFRESH_BUFFER < self.expires_at
    }
}

/// Fetches and caches bearer tokens for one set of client credentials.
pub struct TokenManager {
    http: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    cache: RwLock<Option<CachedToken>>,
}

impl TokenManager {
    pub fn new(
        http: reqwest::Client,
        token_url: String,
        client_id: String,
        client_secret: String,
    ) -> Self {
        Self {
            http,
            token_url,
            client_id,
            client_secret,
            cache: RwLock::new(None),
        }
    }

    /// Returns a valid bearer token, refreshing it when it is missing or
    /// within [`TOKEN_REFRESH_BUFFER`] of expiry.
    pub async fn token(&self) -> Result<String, ClientError> {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref().filter(|t| t.is_fresh(Instant::now())) {
                return Ok(cached.access_token.clone());
            }
        }

        let mut cache = self.cache.write().await;

        // Another caller may have refreshed while we waited for the write lock.
        if let Some(cached) = cache.as_ref().filter(|t| t.is_fresh(Instant::now())) {
            return Ok(cached.access_token.clone());
        }

        debug!(token_url = %self.token_url, "refreshing access token");
        let fetched = self.fetch_token().await?;
        let lifetime = Duration::from_secs(fetched.expires_in).min(MAX_TOKEN_LIFETIME);
        let expires_at = Instant::now() + lifetime;
        debug!(expires_in = fetched.expires_in, "access token refreshed");

        let access_token = fetched.access_token;
        *cache = Some(CachedToken {
            access_token: access_token.clone(),
            expires_at,
        });
        Ok(access_token)
    }

    /// Performs a client-credentials grant against the token endpoint,
    /// bypassing the cache.
    pub async fn fetch_token(&self) -> Result<OAuthTokenResponse, ClientError> {
        let body = OAuthTokenRequest {
            client_id: &self.client_id,
            client_secret: &self.client_secret,
            audience: AUDIENCE,
            grant_type: GRANT_TYPE,
        };

        let response = self
            .http
            .post(&self.token_url)
            .json(&body)
            .send()
            .await
            .map_err(ClientError::TokenRequest)?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!(status = status.as_u16(), "token endpoint rejected credentials grant");
            return Err(ClientError::TokenStatus {
                status: status.as_u16(),
            });
        }

        response
            .json::<OAuthTokenResponse>()
            .await
            .map_err(ClientError::TokenDecode)
    }

    #[cfg(test)]
    pub(crate) async fn seed(&self, access_token: &str, expires_at: Instant) {
        *self.cache.write().await = Some(CachedToken {
            access_token: access_token.to_string(),
            expires_at,
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn manager(server: &MockServer) -> TokenManager {
        TokenManager::new(
            reqwest::Client::new(),
            format!("{}/oauth/token", server.uri()),
            "test-client-id".into(),
            "test-client-secret".into(),
        )
    }

    fn token_body(token: &str) -> serde_json::Value {
        json!({"access_token": token, "token_type": "Bearer", "expires_in": 86400})
    }

    #[tokio::test]
    async fn fetch_token_sends_client_credentials_grant() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({
                "client_id": "test-client-id",
                "client_secret": "test-client-secret",
                "audience": "service",
                "grant_type": "client_credentials"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body("test-token")))
            .expect(1)
            .mount(&server)
            .await;

        let fetched = manager(&server).fetch_token().await.unwrap();
        assert_eq!(fetched.access_token, "test-token");
        assert_eq!(fetched.expires_in, 86400);
    }

    #[tokio::test]
    async fn fetch_token_failure_hides_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(
                ResponseTemplate::new(403).set_body_string("client test-client-secret is blocked"),
            )
            .mount(&server)
            .await;

        let err = manager(&server).fetch_token().await.unwrap_err();
        assert_eq!(err.to_string(), "failed to fetch token: status 403");
        assert_eq!(err.status(), Some(403));
    }

    #[tokio::test]
    async fn fetch_token_rejects_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = manager(&server).fetch_token().await.unwrap_err();
        assert!(matches!(err, ClientError::TokenDecode(_)));
    }

    #[tokio::test]
    async fn cached_token_is_served_without_network_call() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body("new-token")))
            .expect(0)
            .mount(&server)
            .await;

        let manager = manager(&server);
        manager
            .seed("cached-token", Instant::now() + Duration::from_secs(3600))
            .await;

        assert_eq!(manager.token().await.unwrap(), "cached-token");
    }

    #[tokio::test]
    async fn token_inside_refresh_buffer_is_refreshed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body("new-token")))
            .expect(1)
            .mount(&server)
            .await;

        let manager = manager(&server);
        manager
            .seed("old-token", Instant::now() + Duration::from_secs(30))
            .await;

        assert_eq!(manager.token().await.unwrap(), "new-token");
        // The refreshed token is cached.
        assert_eq!(manager.token().await.unwrap(), "new-token");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_callers_share_one_refresh() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(token_body("new-token"))
                    .set_delay(Duration::from_millis(100)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let manager = Arc::new(manager(&server));
        manager.seed("old-token", Instant::now()).await;

        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..8 {
            let manager = Arc::clone(&manager);
            tasks.spawn(async move { manager.token().await });
        }
        while let Some(result) = tasks.join_next().await {
            assert_eq!(result.unwrap().unwrap(), "new-token");
        }
    }

    #[tokio::test]
    async fn failed_refresh_leaves_cache_empty() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(ResponseTemplate::new(500))
            .expect(2)
            .mount(&server)
            .await;

        let manager = manager(&server);
        assert!(manager.token().await.is_err());
        assert!(manager.token().await.is_err());
    }

    #[tokio::test]
    async fn oversized_expiry_is_capped_and_cached() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "long-lived",
                "token_type": "Bearer",
                "expires_in": u64::MAX
            })))
            .expect(1)
            .mount(&server)
            .await;

        let manager = manager(&server);
        assert_eq!(manager.token().await.unwrap(), "long-lived");
        assert_eq!(manager.token().await.unwrap(), "long-lived");
    }

    #[tokio::test]
    async fn empty_access_token_is_not_cached() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body("")))
            .expect(2)
            .mount(&server)
            .await;

        let manager = manager(&server);
        assert_eq!(manager.token().await.unwrap(), "");
        assert_eq!(manager.token().await.unwrap(), "");
    }
}
