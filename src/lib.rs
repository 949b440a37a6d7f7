//! # React AI Bot Library
//!
//! A scheduled Twitter/X content bot. It authenticates with OAuth 2.0
//! Authorization Code Flow with PKCE, generates short tweets about ReactJS and
//! AI through the OpenAI chat completions API, posts them on a fixed interval,
//! and can answer mentions with generated replies.
//!
//! ## Features
//!
//! - HTTP callback server (`/auth`, `/callback`, `/health`, `/status`)
//! - Interval posting that alternates between original tweets and news summaries
//! - Optional mention polling with a per-reply watermark
//! - Inspectable log of scheduled run outcomes
//!
//! ## Configuration
//!
//! - `TWITTER_CLIENT_ID`, `TWITTER_CLIENT_SECRET`: OAuth 2.0 app credentials
//! - `OPENAI_API_KEY`: completion API key
//! - `APP_URL`: public base URL, the redirect URI is `APP_URL/callback`
//! - `PORT`: Server port (defaults to 3000)
//! - `OPENAI_MODEL`, `POST_INTERVAL_SECS`, `MENTION_POLL_INTERVAL_SECS`: optional
//!
//! ## API Endpoints
//!
//! - `GET /auth`: Redirects to the Twitter consent page
//! - `GET /callback`: Completes the OAuth flow
//! - `GET /health`: Returns service health status
//! - `GET /status`: Authentication state and recent scheduled runs

pub mod config;
pub mod content;
pub mod cronjob;
pub mod error;
pub mod handlers;
pub mod oauth;
pub mod poller;
pub mod scheduler;
pub mod state;
pub mod supervisor;
pub mod twitter;

// Re-export commonly used types and functions
pub use config::BotConfig;
pub use content::{ContentGenerator, ContentKind, OpenAiClient};
pub use cronjob::{planned_jobs, start_bot_scheduler};
pub use error::{AuthError, GenerationError, NotAuthenticatedError, PollError, PostError};
pub use handlers::build_router;
pub use oauth::{build_oauth2_user_context_header, AuthSession, AuthenticatedSession};
pub use poller::MentionPoller;
pub use scheduler::PostScheduler;
pub use state::AppState;
pub use supervisor::{RunLog, RunOutcome};
