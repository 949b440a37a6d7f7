//! Outcome log for scheduled runs.
//!
//! Scheduled jobs never propagate errors. Each run ends in a [`RunOutcome`]
//! that is logged and kept in a bounded [`RunLog`], which `/status` and the
//! tests read back.

use chrono::{DateTime, Utc};
use log::{error, info, warn};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::content::ContentKind;

/// Number of runs kept by default.
pub const DEFAULT_RUN_LOG_CAPACITY: usize = 50;

/// Scheduled job names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    Post,
    MentionPoll,
}

/// How a single scheduled run ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum RunOutcome {
    /// Nothing was attempted
    Skipped { reason: String },
    /// A tweet was published
    Posted { kind: ContentKind, tweet_id: String },
    /// Mentions were answered
    Replied { count: usize },
    /// The run failed; `processed` counts replies sent before the failure
    Failed { error: String, processed: usize },
}

impl RunOutcome {
    pub fn skipped(reason: impl Into<String>) -> Self {
        RunOutcome::Skipped {
            reason: reason.into(),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, RunOutcome::Failed { .. })
    }
}

/// One recorded run.
#[derive(Debug, Clone, Serialize)]
pub struct RunRecord {
    pub job: JobKind,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    #[serde(flatten)]
    pub outcome: RunOutcome,
}

/// Bounded, newest-last history of scheduled runs.
#[derive(Debug)]
pub struct RunLog {
    entries: Mutex<VecDeque<RunRecord>>,
    capacity: usize,
}

impl Default for RunLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_RUN_LOG_CAPACITY)
    }
}

impl RunLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity: capacity.max(1),
        }
    }

    /// Logs the outcome and appends it, evicting the oldest record when full.
    pub fn record(&self, job: JobKind, started_at: DateTime<Utc>, outcome: RunOutcome) {
        match &outcome {
            RunOutcome::Skipped { reason } => info!("{:?} run skipped: {}", job, reason),
            RunOutcome::Posted { kind, tweet_id } => {
                info!("{:?} run posted {} tweet {}", job, kind.as_str(), tweet_id)
            }
            RunOutcome::Replied { count } => info!("{:?} run replied to {} mentions", job, count),
            RunOutcome::Failed { error, processed } if *processed > 0 => warn!(
                "{:?} run failed after {} replies: {}",
                job, processed, error
            ),
            RunOutcome::Failed { error, .. } => error!("{:?} run failed: {}", job, error),
        }

        let record = RunRecord {
            job,
            started_at,
            finished_at: Utc::now(),
            outcome,
        };
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(record);
    }

    /// Copy of the recorded runs, oldest first.
    pub fn snapshot(&self) -> Vec<RunRecord> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .cloned()
            .collect()
    }

    /// Most recent record, if any.
    pub fn last(&self) -> Option<RunRecord> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .back()
            .cloned()
    }
}
