use std::sync::Arc;

use anyhow::{Result, anyhow};
use sitesmith_db_memory::InMemoryPlatform;
use sitesmith_jobs::{JobExecutor, JobRegistry, JobScheduler, SchedulerConfig};
use tracing::info;

use crate::builtin::builtin_registry;

fn executor(platform: &Arc<InMemoryPlatform>) -> Arc<JobExecutor<InMemoryPlatform>> {
    let registry: Arc<JobRegistry> = Arc::new(builtin_registry());
    Arc::new(JobExecutor::new(platform.clone(), registry))
}

/// Runs one registered job immediately.
pub async fn run_job(platform: &Arc<InMemoryPlatform>, scope: &str, name: &str) -> Result<()> {
    executor(platform).execute_by_name(scope, name).await?;
    Ok(())
}

/// Runs the scheduler for `scope` until Ctrl-C.
pub async fn schedule(
    platform: &Arc<InMemoryPlatform>,
    scope: &str,
    config: &SchedulerConfig,
) -> Result<()> {
    if platform.scope(scope).is_none() {
        return Err(anyhow!("unknown scope: {scope}"));
    }

    let scheduler = JobScheduler::new(platform.clone(), executor(platform), scope, config.clone());
    let shutdown = scheduler.start();

    tokio::signal::ctrl_c().await?;
    info!(scope = %scope, "Interrupted");
    shutdown.send(true)?;
    Ok(())
}
