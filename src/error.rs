//! Error types for the bot.
//!
//! Each concern has its own error so callers can tell a failed completion from a
//! rejected post or a broken OAuth exchange. Scheduled runs fold them into
//! [`JobError`] before the supervisor records the outcome.

use thiserror::Error;

/// Failure while generating content through the completion API.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("completion request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("completion API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("completion response contained no choices")]
    NoChoices,

    #[error("completion response was empty")]
    EmptyCompletion,

    #[error("reply generation requires a non-empty comment")]
    MissingContext,
}

/// Failure during the OAuth 2.0 authorization code exchange.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no authorization is pending, visit /auth first")]
    NoPendingAuthorization,

    #[error("code verifier does not match the pending authorization")]
    VerifierMismatch,

    #[error("state parameter does not match the pending authorization")]
    StateMismatch,

    #[error("invalid authorization URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("token request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("token exchange rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("token response did not contain an access_token")]
    MissingAccessToken,
}

/// Posting was attempted before the OAuth flow completed.
#[derive(Debug, Error)]
#[error("Twitter client not authenticated. Please visit /auth endpoint first.")]
pub struct NotAuthenticatedError;

/// The platform rejected a post or reply.
#[derive(Debug, Error)]
pub enum PostError {
    #[error("post request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Twitter API error for operation '{operation}' ({status})")]
    Api { operation: String, status: u16 },

    #[error("unexpected response for operation '{operation}': {message}")]
    InvalidResponse { operation: String, message: String },
}

/// Failure during a single mention poll.
///
/// Every variant carries how many mentions were fully handled before the
/// failure so the caller can report partial progress.
#[derive(Debug, Error)]
pub enum PollError {
    #[error("fetching mentions failed: {source}")]
    Fetch {
        #[source]
        source: PostError,
    },

    #[error("generating reply to mention {mention_id} failed after {processed} replies: {source}")]
    Generation {
        processed: usize,
        mention_id: u64,
        #[source]
        source: GenerationError,
    },

    #[error("replying to mention {mention_id} failed after {processed} replies: {source}")]
    Reply {
        processed: usize,
        mention_id: u64,
        #[source]
        source: PostError,
    },
}

impl PollError {
    /// Number of mentions replied to before the poll stopped.
    pub fn processed(&self) -> usize {
        match self {
            PollError::Fetch { .. } => 0,
            PollError::Generation { processed, .. } | PollError::Reply { processed, .. } => {
                *processed
            }
        }
    }
}

/// Invalid or missing configuration at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("environment variable {key} is not a valid {expected}: {value:?}")]
    Invalid {
        key: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Anything a scheduled run can fail with.
#[derive(Debug, Error)]
pub enum JobError {
    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Post(#[from] PostError),

    #[error(transparent)]
    Poll(#[from] PollError),
}
