//! Classification of HTTP error responses from the Grepr API.
//!
//! [`ApiError`] keeps the status code and raw body of any response with a
//! status of 400 or above. Every predicate on it is a pure function of the
//! status code, so callers can branch on not-found or conflict without
//! parsing the message.

use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::error::ClientError;

/// An error response returned by the Grepr API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("API error (status {status}): {message}")]
pub struct ApiError {
    /// HTTP status code.
    pub status: u16,
    /// Response body as received, lossily decoded as UTF-8.
    pub message: String,
}

impl ApiError {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn is_bad_request(&self) -> bool {
        self.status == StatusCode::BAD_REQUEST.as_u16()
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == StatusCode::UNAUTHORIZED.as_u16()
    }

    pub fn is_forbidden(&self) -> bool {
        self.status == StatusCode::FORBIDDEN.as_u16()
    }

    pub fn is_not_found(&self) -> bool {
        self.status == StatusCode::NOT_FOUND.as_u16()
    }

    /// 409, usually a version mismatch on update.
    pub fn is_conflict(&self) -> bool {
        self.status == StatusCode::CONFLICT.as_u16()
    }

    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }

    pub fn is_server_error(&self) -> bool {
        self.status >= 500
    }

    /// Only server errors may succeed when repeated.
    pub fn is_retryable(&self) -> bool {
        self.is_server_error()
    }
}

/// Reads the whole body and turns a status of 400 or above into [`ApiError`].
pub(crate) async fn check_response(response: Response) -> Result<Vec<u8>, ClientError> {
    let status = response.status();
    let body = response.bytes().await.map_err(ClientError::ReadBody)?;

    if status.as_u16() >= 400 {
        return Err(ApiError::new(status.as_u16(), String::from_utf8_lossy(&body)).into());
    }

    Ok(body.to_vec())
}

/// Interprets a response whose body is expected to hold a `T`.
///
/// An empty success body is a decode error, never a default `T`.
pub(crate) async fn handle_response<T: DeserializeOwned>(
    response: Response,
) -> Result<T, ClientError> {
    let body = check_response(response).await?;
    serde_json::from_slice(&body).map_err(ClientError::Decode)
}

/// Like [`handle_response`], but an empty or blank success body yields `None`.
pub(crate) async fn handle_optional_response<T: DeserializeOwned>(
    response: Response,
) -> Result<Option<T>, ClientError> {
    let body = check_response(response).await?;
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(&body)
        .map(Some)
        .map_err(ClientError::Decode)
}
