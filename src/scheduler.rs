//! Scheduled posting.
//!
//! [`PostScheduler::tick`] is invoked once per posting interval. It does
//! nothing until the operator has authenticated, then alternates at random
//! between an original tweet and a news summary.

use log::info;
use rand::Rng;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::content::{ContentGenerator, ContentKind};
use crate::error::JobError;
use crate::oauth::{AuthSession, AuthenticatedSession};
use crate::supervisor::RunOutcome;
use crate::twitter::PostConfirmation;

/// Picks original content or a news summary with equal probability.
pub fn choose_kind<R: Rng + ?Sized>(rng: &mut R) -> ContentKind {
    if rng.gen_bool(0.5) {
        ContentKind::Original
    } else {
        ContentKind::NewsSummary
    }
}

pub struct PostScheduler {
    generator: Arc<ContentGenerator>,
    in_flight: Mutex<()>,
}

impl PostScheduler {
    pub fn new(generator: Arc<ContentGenerator>) -> Self {
        Self {
            generator,
            in_flight: Mutex::new(()),
        }
    }

    /// Runs one scheduled post.
    ///
    /// Never fails: an unauthenticated session or a tick still running from the
    /// previous interval yields [`RunOutcome::Skipped`], errors yield
    /// [`RunOutcome::Failed`].
    pub async fn tick(&self, auth: &AuthSession) -> RunOutcome {
        let Ok(_guard) = self.in_flight.try_lock() else {
            return RunOutcome::skipped("previous post still in flight");
        };

        let session = match auth.session().await {
            Ok(session) => session,
            Err(e) => return RunOutcome::skipped(e.to_string()),
        };

        let kind = choose_kind(&mut rand::thread_rng());
        match self.post_generated(kind, &session).await {
            Ok(confirmation) => RunOutcome::Posted {
                kind,
                tweet_id: confirmation.id,
            },
            Err(e) => RunOutcome::Failed {
                error: e.to_string(),
                processed: 0,
            },
        }
    }

    /// Generates content of `kind` and posts it.
    pub async fn post_generated(
        &self,
        kind: ContentKind,
        session: &AuthenticatedSession,
    ) -> Result<PostConfirmation, JobError> {
        let content = self.generator.generate(kind, None).await?;
        let confirmation = session.post(&content).await?;
        info!("Posted tweet: {}", confirmation.text);
        Ok(confirmation)
    }
}
