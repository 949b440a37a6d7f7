//! Shared application state.
//!
//! One [`AppState`] is built at startup and shared by `Arc` between the HTTP
//! handlers and the scheduled jobs.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

use crate::config::BotConfig;
use crate::content::{ContentGenerator, OpenAiClient};
use crate::error::GenerationError;
use crate::oauth::AuthSession;
use crate::poller::MentionPoller;
use crate::scheduler::PostScheduler;
use crate::supervisor::{JobKind, RunLog, RunOutcome};

/// Timeout applied to every completion request.
pub const COMPLETION_TIMEOUT: Duration = Duration::from_secs(60);

pub struct AppState {
    pub auth: AuthSession,
    pub scheduler: PostScheduler,
    pub poller: MentionPoller,
    pub runs: RunLog,
}

impl AppState {
    pub fn new(auth: AuthSession, generator: Arc<ContentGenerator>) -> Self {
        Self {
            auth,
            scheduler: PostScheduler::new(generator.clone()),
            poller: MentionPoller::new(generator),
            runs: RunLog::default(),
        }
    }

    /// Wires the real Twitter and OpenAI clients from configuration.
    pub fn from_config(config: &BotConfig) -> Result<Self, GenerationError> {
        let backend = OpenAiClient::new(&config.openai_api_key, COMPLETION_TIMEOUT)?;
        let generator = Arc::new(ContentGenerator::new(
            Box::new(backend),
            &config.openai_model,
        ));
        Ok(Self::new(AuthSession::from_config(config), generator))
    }

    /// Runs one scheduled post and records its outcome.
    pub async fn run_post_tick(&self) -> RunOutcome {
        let started_at = Utc::now();
        let outcome = self.scheduler.tick(&self.auth).await;
        self.runs.record(JobKind::Post, started_at, outcome.clone());
        outcome
    }

    /// Runs one mention poll and records its outcome.
    pub async fn run_mention_poll(&self) -> RunOutcome {
        let started_at = Utc::now();
        let outcome = match self.auth.session().await {
            Err(e) => RunOutcome::skipped(e.to_string()),
            Ok(session) => match self.poller.poll_once(&session).await {
                Ok(count) => RunOutcome::Replied { count },
                Err(e) => RunOutcome::Failed {
                    processed: e.processed(),
                    error: e.to_string(),
                },
            },
        };
        self.runs
            .record(JobKind::MentionPoll, started_at, outcome.clone());
        outcome
    }
}
