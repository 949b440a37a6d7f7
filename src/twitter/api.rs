//! Core Twitter API utilities.
//!
//! This module contains low-level helpers for making authenticated requests
//! to the Twitter API and logging their results safely.

use log::{debug, error, info, warn};

use crate::error::PostError;
use crate::oauth::build_oauth2_user_context_header;

use super::TwitterClient;

/// Sanitizes text for safe logging by truncating and escaping control characters.
///
/// This function:
/// - Truncates long text to prevent log flooding
/// - Replaces control characters that could manipulate log output
/// - Escapes newlines to prevent log injection
pub(crate) fn sanitize_for_logging(text: &str, max_len: usize) -> String {
    let sanitized: String = text
        .chars()
        .map(|c| match c {
            '\n' | '\r' | '\t' => ' ',
            c if c.is_control() => '?',
            c => c,
        })
        .collect();

    if sanitized.chars().count() > max_len {
        let head: String = sanitized.chars().take(max_len).collect();
        format!("{}... [truncated, {} total bytes]", head, text.len())
    } else {
        sanitized
    }
}

/// Sends a request with the client's user access token attached.
///
/// # Parameters
///
/// - `client`: The Twitter client holding the access token
/// - `request_builder`: A configured request, without an Authorization header
/// - `operation_name`: Human-readable name for the operation (for logging)
///
/// # Returns
///
/// - `Ok(String)`: The API response body on success
/// - `Err(PostError)`: Transport failure or non-success status. Tokens are not
///   refreshed, a 401 means the operator has to visit `/auth` again.
pub(crate) async fn make_authenticated_request(
    client: &TwitterClient,
    request_builder: reqwest::RequestBuilder,
    operation_name: &str,
) -> Result<String, PostError> {
    info!(
        "Making authenticated request for operation: {}",
        operation_name
    );

    let response = request_builder
        .header(
            "Authorization",
            build_oauth2_user_context_header(&client.access_token),
        )
        .send()
        .await?;

    let status = response.status();
    info!(
        "Received response with status: {} for operation: {}",
        status, operation_name
    );

    if status.is_success() {
        let response_text = response.text().await?;
        debug!(
            "Response summary for '{}': {} bytes received",
            operation_name,
            response_text.len()
        );
        return Ok(response_text);
    }

    if status == reqwest::StatusCode::UNAUTHORIZED {
        warn!(
            "Received 401 Unauthorized for operation '{}' - access token may be expired",
            operation_name
        );
    }

    let error_text = response.text().await.unwrap_or_default();
    error!("Operation '{}' failed - Status: {}", operation_name, status);
    debug!(
        "Error response for '{}': {}",
        operation_name,
        sanitize_for_logging(&error_text, 200)
    );
    Err(PostError::Api {
        operation: operation_name.to_string(),
        status: status.as_u16(),
    })
}

/// Parses a response body as JSON, mapping failures to [`PostError::InvalidResponse`].
pub(crate) fn parse_json(body: &str, operation_name: &str) -> Result<serde_json::Value, PostError> {
    serde_json::from_str(body).map_err(|e| PostError::InvalidResponse {
        operation: operation_name.to_string(),
        message: e.to_string(),
    })
}
