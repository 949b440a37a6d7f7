//! Content generation through the OpenAI chat completions API.
//!
//! [`ContentGenerator`] owns the three prompt templates the bot uses and turns
//! a completion into tweet-sized text. The HTTP call itself sits behind the
//! [`CompletionBackend`] trait so the generator can be driven by a fake in tests.

use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::GenerationError;
use crate::twitter::sanitize_for_logging;

/// Default API base URL.
const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Hard limit for a single tweet, in characters.
pub const MAX_TWEET_CHARS: usize = 280;

const MAX_TOKENS: u32 = 100;
const TEMPERATURE: f64 = 0.7;

/// The kinds of content the bot produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    /// An original tweet about ReactJS or AI
    Original,
    /// A short summary of a current ReactJS or AI trend
    NewsSummary,
    /// A reply to an inbound comment
    Reply,
}

impl ContentKind {
    /// Label used in logs and run records.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Original => "original",
            ContentKind::NewsSummary => "news_summary",
            ContentKind::Reply => "reply",
        }
    }

    fn system_prompt(&self) -> &'static str {
        match self {
            ContentKind::Original => {
                "You are a tech influencer specializing in ReactJS and AI technologies."
            }
            ContentKind::NewsSummary => {
                "You are a tech news curator focusing on ReactJS and AI developments."
            }
            ContentKind::Reply => {
                "You are a knowledgeable tech expert in ReactJS and AI. Provide helpful, accurate responses."
            }
        }
    }

    fn user_prompt(&self, context: Option<&str>) -> String {
        match self {
            ContentKind::Original => "Generate a short, engaging tweet (max 280 characters) about either ReactJS or AI technology.\n\
                 Focus on recent trends, best practices, or interesting insights.\n\
                 Include relevant hashtags like #ReactJS, #AI, #WebDev.\n\
                 Make it informative and professional."
                .to_string(),
            ContentKind::NewsSummary => "Summarize a current trend or development in either ReactJS or AI (max 280 characters).\n\
                 Focus on practical implications and real-world applications.\n\
                 Include relevant hashtags."
                .to_string(),
            ContentKind::Reply => format!(
                "Analyze this comment and generate a helpful, professional response (max 280 characters):\n\
                 \"{}\"\n\
                 If it's a question, provide accurate information.\n\
                 If it's feedback, acknowledge it appropriately.\n\
                 Include relevant React/AI context if applicable.",
                context.unwrap_or_default()
            ),
        }
    }
}

/// A chat message in a completion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }
}

/// Body of a `POST /v1/chat/completions` request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f64,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Something that can answer a chat completion request.
///
/// Returns the text of every choice, in order.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<Vec<String>, GenerationError>;
}

/// Minimal OpenAI chat completions client.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAiClient {
    /// Creates a client with a request timeout.
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self, GenerationError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.into(),
        })
    }

    /// Set the base URL (for testing).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl CompletionBackend for OpenAiClient {
    async fn complete(&self, request: CompletionRequest) -> Result<Vec<String>, GenerationError> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        debug!("Sending completion request to {} (model {})", url, request.model);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!(
                "Completion error body: {}",
                sanitize_for_logging(&body, 200)
            );
            return Err(GenerationError::Api {
                status: status.as_u16(),
                message: sanitize_for_logging(&body, 200),
            });
        }

        let parsed: CompletionResponse = response.json().await?;
        Ok(parsed
            .choices
            .into_iter()
            .map(|c| c.message.content.unwrap_or_default())
            .collect())
    }
}

/// Generates tweets and replies from fixed prompt templates.
pub struct ContentGenerator {
    backend: Box<dyn CompletionBackend>,
    model: String,
}

impl ContentGenerator {
    pub fn new(backend: Box<dyn CompletionBackend>, model: impl Into<String>) -> Self {
        Self {
            backend,
            model: model.into(),
        }
    }

    /// Builds the completion request for a content kind.
    pub fn build_request(&self, kind: ContentKind, context: Option<&str>) -> CompletionRequest {
        CompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(kind.system_prompt()),
                ChatMessage::user(kind.user_prompt(context)),
            ],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        }
    }

    /// Generates content of the given kind.
    ///
    /// `context` is the inbound comment for [`ContentKind::Reply`] and ignored
    /// otherwise. The result is trimmed and capped at [`MAX_TWEET_CHARS`].
    ///
    /// # Errors
    ///
    /// - [`GenerationError::MissingContext`] for a reply without a comment
    /// - [`GenerationError::NoChoices`] / [`GenerationError::EmptyCompletion`]
    ///   when the API answers with nothing usable
    /// - any transport or API error from the backend
    pub async fn generate(
        &self,
        kind: ContentKind,
        context: Option<&str>,
    ) -> Result<String, GenerationError> {
        if kind == ContentKind::Reply && context.map_or(true, |c| c.trim().is_empty()) {
            return Err(GenerationError::MissingContext);
        }

        info!("Generating {} content", kind.as_str());
        let choices = self
            .backend
            .complete(self.build_request(kind, context))
            .await?;

        let first = choices.into_iter().next().ok_or(GenerationError::NoChoices)?;
        let text = first.trim();
        if text.is_empty() {
            return Err(GenerationError::EmptyCompletion);
        }

        let text = enforce_tweet_length(text);
        info!(
            "Generated {} content ({} chars)",
            kind.as_str(),
            text.chars().count()
        );
        Ok(text)
    }
}

/// Caps text at [`MAX_TWEET_CHARS`] characters.
///
/// Over-long text is cut at the last whitespace inside the limit, or hard cut
/// when there is none.
pub fn enforce_tweet_length(text: &str) -> String {
    if text.chars().count() <= MAX_TWEET_CHARS {
        return text.to_string();
    }

    let byte_limit = text
        .char_indices()
        .nth(MAX_TWEET_CHARS)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len());
    let head = &text[..byte_limit];
    let cut = if text[byte_limit..].starts_with(char::is_whitespace) {
        // the limit already falls on a word boundary
        byte_limit
    } else {
        head.char_indices()
            .rev()
            .find(|(_, c)| c.is_whitespace())
            .map(|(idx, _)| idx)
            .filter(|idx| *idx > 0)
            .unwrap_or(byte_limit)
    };

    let truncated = text[..cut].trim_end().to_string();
    warn!(
        "Generated text was {} chars, truncated to {}",
        text.chars().count(),
        truncated.chars().count()
    );
    truncated
}
