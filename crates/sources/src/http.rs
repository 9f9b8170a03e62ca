//! Shared HTTP plumbing for the concrete sources.

use leetdigest_core::error::SourceError;
use std::time::Duration;

pub(crate) const USER_AGENT: &str = "Mozilla/5.0 (compatible; leetdigest/0.1)";

/// Maximum error-body bytes carried into an error message.
const ERROR_BODY_LIMIT: usize = 1024;

pub(crate) fn build_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .expect("Failed to create HTTP client")
}

pub(crate) fn network_error(e: reqwest::Error) -> SourceError {
    if e.is_timeout() {
        SourceError::Timeout(e.to_string())
    } else if e.is_decode() {
        SourceError::Decode(e.to_string())
    } else {
        SourceError::Network(e.to_string())
    }
}

/// Pass 2xx responses through; turn anything else into `ApiError`.
pub(crate) async fn ensure_success(
    response: reqwest::Response,
) -> Result<reqwest::Response, SourceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = read_capped(response, ERROR_BODY_LIMIT)
        .await
        .unwrap_or_default();
    Err(SourceError::ApiError {
        status_code: status.as_u16(),
        message: body.trim().to_string(),
    })
}

/// Read at most `cap` bytes of the body as (lossy) UTF-8.
pub(crate) async fn read_capped(
    mut response: reqwest::Response,
    cap: usize,
) -> Result<String, SourceError> {
    let mut buf: Vec<u8> = Vec::new();
    while let Some(chunk) = response.chunk().await.map_err(network_error)? {
        buf.extend_from_slice(&chunk);
        if buf.len() >= cap {
            buf.truncate(cap);
            break;
        }
    }
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
