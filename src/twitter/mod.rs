//! Twitter/X API integration module.
//!
//! This module contains the client used for posting tweets, replying to tweets
//! and reading mentions using OAuth 2.0 User Context authentication, plus the
//! [`SocialPlatform`] trait the rest of the bot programs against.

mod api;
mod mentions;
mod tweets;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;

use crate::error::PostError;

pub(crate) use api::sanitize_for_logging;

/// Default Twitter API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.x.com";

/// Page size used when fetching mentions.
pub const MENTIONS_PAGE_SIZE: u32 = 100;

/// An inbound mention of the bot account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mention {
    pub id: u64,
    pub text: String,
    pub author_id: Option<String>,
    pub conversation_id: Option<String>,
}

/// The platform's confirmation of a created tweet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostConfirmation {
    pub id: String,
    pub text: String,
}

/// Authenticated operations the bot needs from the social platform.
#[async_trait]
pub trait SocialPlatform: Send + Sync {
    /// Posts a standalone tweet.
    async fn post_tweet(&self, text: &str) -> Result<PostConfirmation, PostError>;

    /// Posts `text` as a threaded reply to `in_reply_to`.
    async fn reply_to_tweet(
        &self,
        text: &str,
        in_reply_to: u64,
    ) -> Result<PostConfirmation, PostError>;

    /// Fetches at most `max_results` mentions with an id greater than `since_id`.
    async fn fetch_mentions(
        &self,
        since_id: Option<u64>,
        max_results: u32,
    ) -> Result<Vec<Mention>, PostError>;
}

/// Twitter API v2 client bound to one user access token.
#[derive(Debug)]
pub struct TwitterClient {
    client: Client,
    access_token: String,
    base_url: String,
    user_id: OnceCell<String>,
}

impl TwitterClient {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            access_token: access_token.into(),
            base_url: DEFAULT_API_BASE.into(),
            user_id: OnceCell::new(),
        }
    }

    /// Set the base URL (for testing).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl SocialPlatform for TwitterClient {
    async fn post_tweet(&self, text: &str) -> Result<PostConfirmation, PostError> {
        tweets::create_tweet(self, text, None).await
    }

    async fn reply_to_tweet(
        &self,
        text: &str,
        in_reply_to: u64,
    ) -> Result<PostConfirmation, PostError> {
        tweets::create_tweet(self, text, Some(in_reply_to)).await
    }

    async fn fetch_mentions(
        &self,
        since_id: Option<u64>,
        max_results: u32,
    ) -> Result<Vec<Mention>, PostError> {
        mentions::fetch_mentions(self, since_id, max_results).await
    }
}
