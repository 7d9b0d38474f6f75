//! Shared `reqwest` plumbing.

use crate::wire::{excerpt, parse_body};
use docver_core::error::{DocverError, Result};
use reqwest::{Client, Response};
use serde_json::Value;
use std::time::Duration;

/// Builds the client shared by every adapter of one run.
pub fn build_client(request_timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(request_timeout)
        .build()
        .map_err(|e| DocverError::config(format!("Failed to build HTTP client: {}", e)))
}

pub(crate) fn map_send_error(operation: &'static str, err: reqwest::Error) -> DocverError {
    if err.is_timeout() {
        DocverError::Timeout { operation }
    } else {
        DocverError::transport(operation, err.to_string())
    }
}

/// Reads the body, failing on non-2xx HTTP status, and parses it as JSON.
///
/// Returns the parsed value together with the raw text for diagnostics.
pub(crate) async fn read_json(operation: &'static str, response: Response) -> Result<(Value, String)> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| map_send_error(operation, e))?;

    if !status.is_success() {
        tracing::error!("[Http] {} failed with HTTP {}", operation, status);
        return Err(DocverError::rejected(
            operation,
            format!("HTTP {}", status.as_u16()),
            excerpt(&body),
        ));
    }

    let value = parse_body(operation, &body)?;
    Ok((value, body))
}
