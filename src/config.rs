//! Client configuration, built in code or loaded from a TOML file.
//!
//! Values missing from the file fall back to sensible defaults: the production
//! Auth0 domain, a 30 second HTTP timeout and a 5 second poll interval.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Auth0 tenant used when none is configured.
pub const DEFAULT_AUTH0_DOMAIN: &str = "grepr-prod.us.auth0.com";

/// Connection parameters for a [`Client`](crate::Client).
#[derive(Clone, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the Grepr deployment, without the `/api` suffix.
    pub host: String,

    pub client_id: String,

    pub client_secret: String,

    /// Identity provider domain. An empty value means the default.
    #[serde(default = "default_auth0_domain")]
    pub auth0_domain: String,

    /// Full token endpoint URL. Overrides `https://{auth0_domain}/oauth/token`.
    #[serde(default)]
    pub token_url: Option<String>,

    /// Per-request timeout of the underlying HTTP client.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Delay between two reads in the wait loops.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

/// Default identity provider domain: the production Grepr tenant.
fn default_auth0_domain() -> String {
    DEFAULT_AUTH0_DOMAIN.to_string()
}

/// Default per-request timeout: 30s.
fn default_request_timeout_secs() -> u64 {
    30
}

/// Default delay between wait-loop reads: 5000ms.
fn default_poll_interval_ms() -> u64 {
    5000
}

impl ClientConfig {
    pub fn new(
        host: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            auth0_domain: default_auth0_domain(),
            token_url: None,
            request_timeout_secs: default_request_timeout_secs(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }

    pub fn with_auth0_domain(mut self, domain: impl Into<String>) -> Self {
        self.auth0_domain = domain.into();
        self
    }

    /// Point token acquisition at an explicit URL (useful for testing).
    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = Some(url.into());
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Parses a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("invalid client configuration")
    }

    /// Loads the configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml_str(&contents)
    }

    /// The OAuth token endpoint derived from the domain, unless overridden.
    pub fn token_endpoint(&self) -> String {
        match &self.token_url {
            Some(url) => url.clone(),
            None => {
                let domain = if self.auth0_domain.is_empty() {
                    DEFAULT_AUTH0_DOMAIN
                } else {
                    self.auth0_domain.as_str()
                };
                format!("https://{domain}/oauth/token")
            }
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("host", &self.host)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("auth0_domain", &self.auth0_domain)
            .field("token_url", &self.token_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("poll_interval_ms", &self.poll_interval_ms)
            .finish()
    }
}
