//! Cronjob module for scheduled tasks.
//!
//! This module registers the bot's repeating jobs with `tokio-cron-scheduler`:
//! the posting tick, and the mention poll when it is enabled in configuration.

use log::info;
use std::sync::Arc;
use std::time::Duration;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use crate::config::BotConfig;
use crate::state::AppState;
use crate::supervisor::JobKind;

/// The repeating jobs a configuration asks for, with their intervals.
///
/// Posting is always scheduled. Mention polling is scheduled only when
/// `MENTION_POLL_INTERVAL_SECS` is set.
pub fn planned_jobs(config: &BotConfig) -> Vec<(JobKind, Duration)> {
    let mut jobs = vec![(JobKind::Post, config.post_interval)];
    if let Some(interval) = config.mention_poll_interval {
        jobs.push((JobKind::MentionPoll, interval));
    }
    jobs
}

/// Creates the job scheduler with all planned jobs registered.
///
/// The scheduler is returned unstarted. Each job fires first after one full
/// interval and records its outcome in the state's run log.
///
/// # Errors
///
/// Fails if the scheduler cannot be created or a job cannot be added.
pub async fn start_bot_scheduler(
    state: Arc<AppState>,
    jobs: &[(JobKind, Duration)],
) -> Result<JobScheduler, JobSchedulerError> {
    let sched = JobScheduler::new().await?;

    for &(kind, interval) in jobs {
        let job_state = state.clone();
        let job = match kind {
            JobKind::Post => Job::new_repeated_async(interval, move |_uuid, _l| {
                let state = job_state.clone();
                Box::pin(async move {
                    info!("Starting scheduled post");
                    state.run_post_tick().await;
                })
            })?,
            JobKind::MentionPoll => Job::new_repeated_async(interval, move |_uuid, _l| {
                let state = job_state.clone();
                Box::pin(async move {
                    info!("Starting scheduled mention poll");
                    state.run_mention_poll().await;
                })
            })?,
        };
        sched.add(job).await?;
        info!(
            "Scheduled {:?} job every {} seconds",
            kind,
            interval.as_secs()
        );
    }

    Ok(sched)
}
