//! Job methods shipped with the binary.

use async_trait::async_trait;
use sitesmith_core::SiteHandle;
use sitesmith_jobs::{JobMethod, JobMethodError, JobRegistry};
use tracing::info;

/// Logs that the site was reached.
#[derive(Debug, Default)]
pub struct SiteHeartbeat;

#[async_trait]
impl JobMethod for SiteHeartbeat {
    const DECLARING_TYPE: &'static str = "sitesmith::builtin::SiteHeartbeat";
    const METHOD_NAME: &'static str = "run";

    async fn run(&self, site: &SiteHandle) -> Result<(), JobMethodError> {
        info!(scope = %site.scope, site = %site.url, "Heartbeat");
        Ok(())
    }
}

/// Registry with every built-in method.
pub fn builtin_registry() -> JobRegistry {
    let registry = JobRegistry::new();
    registry.register::<SiteHeartbeat>();
    registry
}
