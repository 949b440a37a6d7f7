//! Mention polling and reply generation.
//!
//! The poller keeps a watermark of the last mention it replied to. Each poll
//! fetches newer mentions, answers them oldest first and advances the
//! watermark after every successful reply, so a failure part way through a
//! batch never causes already-answered mentions to be answered again.

use log::{error, info};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};

use crate::content::{ContentGenerator, ContentKind};
use crate::error::PollError;
use crate::oauth::AuthenticatedSession;
use crate::twitter::{sanitize_for_logging, MENTIONS_PAGE_SIZE};

pub struct MentionPoller {
    generator: Arc<ContentGenerator>,
    /// Held for a whole poll.
    watermark: Mutex<Option<u64>>,
    /// Copy of the watermark for readers that must not wait on a poll.
    published: watch::Sender<Option<u64>>,
    page_size: u32,
}

impl MentionPoller {
    pub fn new(generator: Arc<ContentGenerator>) -> Self {
        Self {
            generator,
            watermark: Mutex::new(None),
            published: watch::channel(None).0,
            page_size: MENTIONS_PAGE_SIZE,
        }
    }

    /// Starts from a known watermark instead of an empty one.
    #[must_use]
    pub fn with_watermark(mut self, watermark: u64) -> Self {
        self.watermark = Mutex::new(Some(watermark));
        self.published.send_replace(Some(watermark));
        self
    }

    /// Id of the last mention successfully replied to.
    ///
    /// Does not wait for a poll in progress.
    pub fn watermark(&self) -> Option<u64> {
        *self.published.borrow()
    }

    /// Fetches and answers new mentions.
    ///
    /// The watermark lock is held for the whole poll, so overlapping calls run
    /// one after the other.
    ///
    /// # Returns
    ///
    /// - `Ok(n)`: all `n` fetched mentions were answered
    /// - `Err(PollError)`: the batch stopped at the first failure;
    ///   [`PollError::processed`] tells how many were answered before it
    pub async fn poll_once(&self, session: &AuthenticatedSession) -> Result<usize, PollError> {
        let mut watermark = self.watermark.lock().await;
        info!("Polling mentions newer than {:?}", *watermark);

        let mut mentions = session
            .mentions_since(*watermark, self.page_size)
            .await
            .map_err(|source| PollError::Fetch { source })?;
        let floor = *watermark;
        mentions.retain(|m| floor.map_or(true, |w| m.id > w));
        mentions.sort_by_key(|m| m.id);

        let mut processed = 0;
        for mention in mentions {
            let reply = self
                .generator
                .generate(ContentKind::Reply, Some(&mention.text))
                .await
                .map_err(|source| PollError::Generation {
                    processed,
                    mention_id: mention.id,
                    source,
                })?;

            if let Err(source) = session.reply(&reply, mention.id).await {
                error!("Failed to reply to mention {}: {}", mention.id, source);
                return Err(PollError::Reply {
                    processed,
                    mention_id: mention.id,
                    source,
                });
            }

            info!(
                "Responded to mention {}: {}",
                mention.id,
                sanitize_for_logging(&reply, 80)
            );
            *watermark = Some(watermark.map_or(mention.id, |w| w.max(mention.id)));
            self.published.send_replace(*watermark);
            processed += 1;
        }

        Ok(processed)
    }
}
