//! Tweet operations for Twitter API.
//!
//! This module contains the function for posting tweets and replies
//! using the Twitter API v2.

use log::{debug, info};
use serde_json::json;

use crate::error::PostError;

use super::api::{make_authenticated_request, parse_json};
use super::{PostConfirmation, TwitterClient};

/// Posts a tweet, optionally as a reply, via `POST /2/tweets`.
///
/// # Parameters
///
/// - `client`: The authenticated Twitter client
/// - `text`: The text content of the tweet
/// - `reply_to_tweet_id`: The tweet to reply to, if any
///
/// # Returns
///
/// - `Ok(PostConfirmation)`: The id and text of the created tweet
/// - `Err(PostError)`: Network error, API error or a malformed response
pub(crate) async fn create_tweet(
    client: &TwitterClient,
    text: &str,
    reply_to_tweet_id: Option<u64>,
) -> Result<PostConfirmation, PostError> {
    let operation = match reply_to_tweet_id {
        Some(id) => {
            info!("Starting reply operation to tweet {}", id);
            "reply_to_tweet"
        }
        None => {
            info!("Starting tweet post operation");
            "post_tweet"
        }
    };

    let url = format!("{}/2/tweets", client.base_url);
    let payload = match reply_to_tweet_id {
        Some(id) => json!({
            "text": text,
            "reply": { "in_reply_to_tweet_id": id.to_string() }
        }),
        None => json!({ "text": text }),
    };
    debug!("Request URL: {}", url);
    debug!("Request headers: Authorization: Bearer [REDACTED], Content-Type: application/json");

    let request_builder = client.client.post(&url).json(&payload);
    let body = make_authenticated_request(client, request_builder, operation).await?;

    let json_response = parse_json(&body, operation)?;
    let data = json_response
        .get("data")
        .ok_or_else(|| PostError::InvalidResponse {
            operation: operation.to_string(),
            message: "missing data object".into(),
        })?;

    let confirmation: PostConfirmation =
        serde_json::from_value(data.clone()).map_err(|e| PostError::InvalidResponse {
            operation: operation.to_string(),
            message: e.to_string(),
        })?;

    info!("Posted tweet {}: {}", confirmation.id, confirmation.text);
    Ok(confirmation)
}
