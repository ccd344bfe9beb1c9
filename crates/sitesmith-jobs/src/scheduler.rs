//! Cron scheduler for registered jobs.
//!
//! Polls the scheduler host for descriptors on a fixed interval and runs the
//! ones whose cron schedule came due since they last ran.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sitesmith_core::{JobDescriptor, JobPlatform, Result};
use tokio::sync::watch;
use tokio::time::interval;
use tracing::{debug, error, info};

use crate::executor::JobExecutor;
use crate::schedule::parse_cron;

/// Look-back cap for jobs that have not run yet.
const MAX_WINDOW_SECS: u64 = 7 * 24 * 60 * 60;

fn default_check_interval_secs() -> u64 {
    60
}

/// Configuration for the job scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// How often to look for due jobs, in seconds.
    #[serde(default = "default_check_interval_secs")]
    pub check_interval_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            check_interval_secs: default_check_interval_secs(),
        }
    }
}

impl SchedulerConfig {
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.check_interval_secs == 0 {
            return Err("jobs.check_interval_secs must be > 0".into());
        }
        Ok(())
    }

    /// Tick period of the background loop, never shorter than one second.
    pub fn tick_period(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs.max(1))
    }

    fn window(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.check_interval_secs.min(MAX_WINDOW_SECS) as i64)
    }
}

/// Runs due jobs for one scope.
pub struct JobScheduler<P: JobPlatform + ?Sized> {
    platform: Arc<P>,
    executor: Arc<JobExecutor<P>>,
    scope: String,
    config: SchedulerConfig,
    /// Last run per job name
    last_runs: HashMap<String, DateTime<Utc>>,
    /// Reference point of the previous completed check
    last_tick: Option<DateTime<Utc>>,
}

impl<P: JobPlatform + ?Sized + 'static> JobScheduler<P> {
    pub fn new(
        platform: Arc<P>,
        executor: Arc<JobExecutor<P>>,
        scope: impl Into<String>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            platform,
            executor,
            scope: scope.into(),
            config,
            last_runs: HashMap::new(),
            last_tick: None,
        }
    }

    /// Start the scheduler in a background task.
    ///
    /// Returns a shutdown sender; send `true` to stop it.
    pub fn start(mut self) -> watch::Sender<bool> {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        tokio::spawn(async move {
            info!(
                scope = %self.scope,
                check_interval_secs = self.config.check_interval_secs,
                "Job scheduler started"
            );

            let mut ticker = interval(self.config.tick_period());

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(e) = self.check_and_run(Utc::now()).await {
                            error!(scope = %self.scope, error = %e, "Error in job scheduler tick");
                        }
                    }
                    _ = shutdown_rx.changed() => {
                        if *shutdown_rx.borrow() {
                            info!(scope = %self.scope, "Job scheduler shutting down");
                            break;
                        }
                    }
                }
            }
        });

        shutdown_tx
    }

    /// Runs every job that is due at `now`, returning how many ran.
    ///
    /// Descriptors with an unparseable schedule are skipped. A failing job is
    /// logged and counts as run, so it is not retried until its next
    /// occurrence.
    pub async fn check_and_run(&mut self, now: DateTime<Utc>) -> Result<usize> {
        let jobs = self.platform.list_jobs(&self.scope).await?;
        let mut ran = 0;

        for job in jobs {
            if !self.is_due(&job, now) {
                continue;
            }

            self.last_runs.insert(job.name.clone(), now);
            ran += 1;

            if let Err(e) = self.executor.execute(&job, &self.scope).await {
                error!(scope = %self.scope, job = %job.name, error = %e, "Scheduled job failed");
            }
        }

        self.last_tick = Some(now);
        Ok(ran)
    }

    /// Last time the scheduler ran `name`.
    pub fn last_run(&self, name: &str) -> Option<DateTime<Utc>> {
        self.last_runs.get(name).copied()
    }

    /// A job is due when its next occurrence after the reference point is not
    /// in the future. The reference point is the job's last run, else the
    /// previous check, else one check interval ago on the first check.
    fn is_due(&self, job: &JobDescriptor, now: DateTime<Utc>) -> bool {
        let cron = match parse_cron(&job.schedule) {
            Ok(cron) => cron,
            Err(e) => {
                error!(
                    scope = %self.scope,
                    job = %job.name,
                    schedule = %job.schedule,
                    error = %e,
                    "Invalid job schedule"
                );
                return false;
            }
        };

        let since = self
            .last_runs
            .get(&job.name)
            .copied()
            .or(self.last_tick)
            .unwrap_or_else(|| now - self.config.window());

        match cron.find_next_occurrence(&since, false) {
            Ok(next) if next <= now => {
                debug!(scope = %self.scope, job = %job.name, due = %next, "Job due");
                true
            }
            _ => false,
        }
    }
}
