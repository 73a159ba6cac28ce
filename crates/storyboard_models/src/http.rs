//! Shared HTTP plumbing for the Gemini REST API.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Base URL of the Generative Language API.
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// A failed round trip, before it is mapped to a caller-specific error.
#[derive(Debug)]
pub(crate) enum HttpFailure {
    /// Connection, timeout or body read failure
    Transport(String),
    /// Non-success status
    Status { status_code: u16, message: String },
}

pub(crate) fn build_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()
}

/// POST a JSON body and return the response text on success.
pub(crate) async fn post_json<B: Serialize + ?Sized>(
    client: &reqwest::Client,
    url: &str,
    api_key: &str,
    body: &B,
) -> Result<String, HttpFailure> {
    debug!(url = %url, "Sending Gemini API request");

    let response = client
        .post(url)
        .header("x-goog-api-key", api_key)
        .json(body)
        .send()
        .await
        .map_err(|e| match e.status() {
            Some(status) => HttpFailure::Status {
                status_code: status.as_u16(),
                message: e.to_string(),
            },
            None => HttpFailure::Transport(e.to_string()),
        })?;

    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| HttpFailure::Transport(format!("Failed to read response body: {}", e)))?;

    if !status.is_success() {
        return Err(HttpFailure::Status {
            status_code: status.as_u16(),
            message: describe_api_error(&text),
        });
    }

    Ok(text)
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

/// Condense a Google API error body into one line.
///
/// The status string (e.g. `RESOURCE_EXHAUSTED`) is kept so that configured
/// text signals can match it.
///
/// # Examples
///
/// ```
/// use storyboard_models::describe_api_error;
///
/// let body = r#"{"error":{"code":429,"message":"Quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#;
/// assert_eq!(describe_api_error(body), "RESOURCE_EXHAUSTED: Quota exceeded");
/// assert_eq!(describe_api_error("  plain text  "), "plain text");
/// ```
pub fn describe_api_error(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) if !envelope.error.status.is_empty() => {
            format!("{}: {}", envelope.error.status, envelope.error.message)
        }
        Ok(envelope) => envelope.error.message,
        Err(_) => body.trim().to_string(),
    }
}
