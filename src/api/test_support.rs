//! Fixtures shared by the unit tests of the api modules.

use std::time::Duration;

use serde_json::json;
use tokio::time::Instant;
use wiremock::MockServer;

use super::client::Client;
use crate::config::ClientConfig;

/// A job body as the server renders it.
pub(crate) fn job_json(id: &str, state: &str) -> serde_json::Value {
    json!({
        "id": id,
        "version": 1,
        "name": "pipeline",
        "state": state,
        "desiredState": "RUNNING",
        "jobGraph": {"vertices": [], "edges": []},
        "organizationId": "org-1",
        "tags": {},
        "teamIds": [],
        "createdAt": "2026-01-01T00:00:00Z",
        "updatedAt": "2026-01-01T00:00:00Z"
    })
}

/// Client pointed at `server` with a warm token cache, so only job traffic
/// reaches the mock.
pub(crate) async fn test_client(server: &MockServer) -> Client {
    let config = ClientConfig::new(server.uri(), "test", "test")
        .with_token_url(format!("{}/oauth/token", server.uri()))
        .with_poll_interval(Duration::from_millis(10));
    let client = Client::new(config).unwrap();
    client
        .auth()
        .seed("test-token", Instant::now() + Duration::from_secs(3600))
        .await;
    client
}
