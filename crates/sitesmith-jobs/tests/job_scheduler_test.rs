//! Scheduler due-time tests with an explicit clock.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use sitesmith_core::{JobDescriptor, SchedulerHost, SiteHandle};
use sitesmith_db_memory::{InMemoryPlatform, ScopeState};
use sitesmith_jobs::{
    JobExecutor, JobMethod, JobMethodError, JobReconciler, JobRegistry, JobScheduler, JobSpec,
    Schedule, SchedulerConfig,
};

const SCOPE: &str = "webapp";
const SITE: &str = "https://intranet/ops";

static HOURLY_RUNS: AtomicUsize = AtomicUsize::new(0);
static FLAKY_RUNS: AtomicUsize = AtomicUsize::new(0);

#[derive(Default)]
struct Hourly;

#[async_trait]
impl JobMethod for Hourly {
    const DECLARING_TYPE: &'static str = "tests::Hourly";
    const METHOD_NAME: &'static str = "run";

    async fn run(&self, _site: &SiteHandle) -> Result<(), JobMethodError> {
        HOURLY_RUNS.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
struct Flaky;

#[async_trait]
impl JobMethod for Flaky {
    const DECLARING_TYPE: &'static str = "tests::Flaky";
    const METHOD_NAME: &'static str = "run";

    async fn run(&self, _site: &SiteHandle) -> Result<(), JobMethodError> {
        FLAKY_RUNS.fetch_add(1, Ordering::SeqCst);
        Err("flaky".into())
    }
}

fn at(hour: u32, minute: u32, second: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, hour, minute, second).unwrap()
}

async fn scheduler(jobs: &[JobSpec]) -> (Arc<InMemoryPlatform>, JobScheduler<InMemoryPlatform>) {
    let platform = InMemoryPlatform::new();
    platform.insert_scope(SCOPE, ScopeState::new("CORP\\spadmin").with_site(SITE));
    let platform = Arc::new(platform);

    let reconciler = JobReconciler::new(platform.clone());
    for job in jobs {
        reconciler.create(job, SCOPE).await.unwrap();
    }

    let registry = JobRegistry::new();
    registry.register::<Hourly>();
    registry.register::<Flaky>();
    let executor = Arc::new(JobExecutor::new(platform.clone(), Arc::new(registry)));

    let scheduler = JobScheduler::new(
        platform.clone(),
        executor,
        SCOPE,
        SchedulerConfig {
            check_interval_secs: 60,
        },
    );
    (platform, scheduler)
}

#[tokio::test]
async fn test_runs_once_per_occurrence() {
    let spec = JobSpec::builder("Hourly Report", SITE)
        .schedule(Schedule::hourly(0).unwrap())
        .bind::<Hourly>()
        .build()
        .unwrap();
    let (_platform, mut scheduler) = scheduler(&[spec.clone()]).await;

    assert_eq!(scheduler.check_and_run(at(10, 0, 30)).await.unwrap(), 1);
    assert_eq!(scheduler.check_and_run(at(10, 1, 30)).await.unwrap(), 0);
    assert_eq!(scheduler.check_and_run(at(10, 30, 0)).await.unwrap(), 0);
    assert_eq!(scheduler.check_and_run(at(11, 0, 10)).await.unwrap(), 1);

    assert!(HOURLY_RUNS.load(Ordering::SeqCst) >= 2);
    assert_eq!(
        scheduler.last_run(&spec.effective_name()),
        Some(at(11, 0, 10))
    );
}

#[tokio::test]
async fn test_first_check_ignores_older_occurrences() {
    let spec = JobSpec::builder("Morning Digest", SITE)
        .schedule(Schedule::daily(6, 0).unwrap())
        .bind::<Hourly>()
        .build()
        .unwrap();
    let (_platform, mut scheduler) = scheduler(&[spec]).await;

    assert_eq!(scheduler.check_and_run(at(9, 0, 0)).await.unwrap(), 0);
}

#[tokio::test]
async fn test_late_tick_still_runs_missed_occurrence() {
    let spec = JobSpec::builder("Early Digest", SITE)
        .schedule(Schedule::daily(6, 0).unwrap())
        .bind::<Hourly>()
        .build()
        .unwrap();
    let (_platform, mut scheduler) = scheduler(&[spec.clone()]).await;

    assert_eq!(scheduler.check_and_run(at(5, 59, 59)).await.unwrap(), 0);
    // More than one check interval later, the 06:00 occurrence is still due.
    assert_eq!(scheduler.check_and_run(at(6, 1, 30)).await.unwrap(), 1);
    assert_eq!(scheduler.last_run(&spec.effective_name()), Some(at(6, 1, 30)));
    assert_eq!(scheduler.check_and_run(at(6, 2, 30)).await.unwrap(), 0);
}

#[tokio::test]
async fn test_failing_job_does_not_block_others() {
    let flaky = JobSpec::builder("Flaky", SITE)
        .schedule(Schedule::cron("* * * * *").unwrap())
        .bind::<Flaky>()
        .build()
        .unwrap();
    let (platform, mut scheduler) = scheduler(&[flaky]).await;

    platform
        .register_job(
            SCOPE,
            JobDescriptor {
                name: "broken".to_string(),
                url: SITE.to_string(),
                schedule: "not a schedule".to_string(),
                declaring_type: "tests::Hourly".to_string(),
                method_name: "run".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let ran = scheduler.check_and_run(at(12, 0, 5)).await.unwrap();
    assert_eq!(ran, 1);
    assert_eq!(FLAKY_RUNS.load(Ordering::SeqCst), 1);
    assert!(scheduler.last_run("broken").is_none());
}

#[tokio::test]
async fn test_start_and_shutdown() {
    let (_platform, scheduler) = scheduler(&[]).await;
    let shutdown = scheduler.start();
    shutdown.send(true).unwrap();
}

#[tokio::test]
async fn test_start_with_zero_interval() {
    let platform = InMemoryPlatform::new();
    platform.insert_scope(SCOPE, ScopeState::new("CORP\\spadmin").with_site(SITE));
    let platform = Arc::new(platform);
    let executor = Arc::new(JobExecutor::new(platform.clone(), Arc::new(JobRegistry::new())));
    let scheduler = JobScheduler::new(
        platform,
        executor,
        SCOPE,
        SchedulerConfig {
            check_interval_secs: 0,
        },
    );

    let shutdown = scheduler.start();
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    assert!(shutdown.send(true).is_ok());
}
