//! HTTP utilities for Google REST API calls
//!
//! Discovery is read-only, so only GET is exposed. Responses are
//! classified: 404 is surfaced as `NotFound` so callers can apply the
//! benign-absence rule; every other non-2xx status is a transport failure.

use crate::core::DiscoveryError;
use reqwest::Client;
use serde_json::Value;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Sanitize response body for logging
/// Truncates long responses and masks potentially sensitive patterns
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        format!(
            "{}... [truncated, {} bytes total]",
            &body[..MAX_LOG_BODY_LENGTH],
            body.len()
        )
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// HTTP client wrapper for Google API calls
#[derive(Clone)]
pub struct GoogleHttpClient {
    client: Client,
}

impl GoogleHttpClient {
    pub fn new() -> Result<Self, DiscoveryError> {
        let client = Client::builder()
            .user_agent(concat!("tfharvest/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| {
                DiscoveryError::transport(format!("failed to create HTTP client: {err}"))
            })?;

        Ok(Self { client })
    }

    /// Make a GET request and classify the response.
    pub async fn get(&self, url: &str, token: &str) -> Result<Value, DiscoveryError> {
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|err| DiscoveryError::transport(format!("failed to send request: {err}")))?;

        let status = response.status();
        let body = response.text().await.map_err(|err| {
            DiscoveryError::transport(format!("failed to read response body: {err}"))
        })?;

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(DiscoveryError::NotFound);
        }
        if !status.is_success() {
            // Only log a sanitized, truncated body to avoid leaking sensitive data
            tracing::debug!("API error: {} - {}", status, sanitize_for_log(&body));
            return Err(DiscoveryError::transport(format!(
                "API request failed: {status}"
            )));
        }

        if body.is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&body).map_err(|err| {
            DiscoveryError::transport(format!("failed to parse response JSON: {err}"))
        })
    }
}

impl Default for GoogleHttpClient {
    fn default() -> Self {
        Self::new().expect("Failed to create default HTTP client")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_truncates_long_bodies() {
        let body = "x".repeat(500);
        let sanitized = sanitize_for_log(&body);
        assert!(sanitized.contains("[truncated, 500 bytes total]"));
        assert!(sanitized.len() < body.len());
    }

    #[test]
    fn sanitize_strips_non_printable_characters() {
        let sanitized = sanitize_for_log("ok\x07\x1b[31mtext");
        assert_eq!(sanitized, "ok[31mtext");
    }
}
