//! Mention lookups for the authenticated account.
//!
//! Mentions are read from `GET /2/users/:id/mentions`. The account id is
//! resolved once through `GET /2/users/me` and cached on the client.

use log::{debug, info, warn};

use crate::error::PostError;

use super::api::{make_authenticated_request, parse_json, sanitize_for_logging};
use super::{Mention, TwitterClient};

/// Resolves and caches the id of the account the access token belongs to.
async fn authenticated_user_id(client: &TwitterClient) -> Result<&str, PostError> {
    let id = client
        .user_id
        .get_or_try_init(|| async {
            let url = format!("{}/2/users/me", client.base_url);
            let request_builder = client.client.get(&url);
            let body = make_authenticated_request(client, request_builder, "users_me").await?;
            let json_response = parse_json(&body, "users_me")?;
            let id = json_response
                .get("data")
                .and_then(|d| d.get("id"))
                .and_then(|v| v.as_str())
                .ok_or_else(|| PostError::InvalidResponse {
                    operation: "users_me".into(),
                    message: "missing data.id".into(),
                })?;
            info!("Resolved authenticated user id {}", id);
            Ok::<String, PostError>(id.to_string())
        })
        .await?;
    Ok(id.as_str())
}

/// Fetches mentions newer than `since_id`, oldest first.
pub(crate) async fn fetch_mentions(
    client: &TwitterClient,
    since_id: Option<u64>,
    max_results: u32,
) -> Result<Vec<Mention>, PostError> {
    let user_id = authenticated_user_id(client).await?;

    let mut url = format!(
        "{}/2/users/{}/mentions?max_results={}&tweet.fields={}",
        client.base_url,
        urlencoding::encode(user_id),
        max_results,
        urlencoding::encode("text,author_id,conversation_id")
    );
    if let Some(since_id) = since_id {
        url.push_str(&format!("&since_id={}", since_id));
    }
    info!("Fetching mentions since {:?}", since_id);
    debug!("Mentions URL: {}", url);

    let request_builder = client.client.get(&url);
    let body = make_authenticated_request(client, request_builder, "fetch_mentions").await?;
    let json_response = parse_json(&body, "fetch_mentions")?;

    let mut mentions = Vec::new();
    let Some(tweets) = json_response.get("data").and_then(|d| d.as_array()) else {
        info!("No new mentions found");
        return Ok(mentions);
    };

    for tweet in tweets {
        let (Some(id), Some(text)) = (
            tweet.get("id").and_then(|v| v.as_str()),
            tweet.get("text").and_then(|v| v.as_str()),
        ) else {
            warn!("Skipping malformed mention entry");
            continue;
        };

        let id: u64 = id.parse().map_err(|_| PostError::InvalidResponse {
            operation: "fetch_mentions".into(),
            message: format!("non-numeric tweet id {:?}", id),
        })?;

        debug!("Mention {}: {}", id, sanitize_for_logging(text, 120));
        mentions.push(Mention {
            id,
            text: text.to_string(),
            author_id: tweet
                .get("author_id")
                .and_then(|v| v.as_str())
                .map(str::to_string),
            conversation_id: tweet
                .get("conversation_id")
                .and_then(|v| v.as_str())
                .map(str::to_string),
        });
    }

    mentions.sort_by_key(|m| m.id);
    info!("Found {} new mentions", mentions.len());
    Ok(mentions)
}
