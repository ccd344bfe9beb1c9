//! Job reconciliation.
//!
//! `create` is delete-then-register: every descriptor already registered
//! under the job's effective name is dropped before the fresh one goes in, so
//! repeated runs leave exactly one.

use std::sync::Arc;

use sitesmith_core::{JobDescriptor, JobPlatform, ReconcileError, Result, SiteHandle};
use tracing::{debug, info};

use crate::copy::materialize;
use crate::job::JobSpec;

/// Registers and removes [`JobSpec`]s on a scheduler host.
pub struct JobReconciler<P: JobPlatform + ?Sized> {
    platform: Arc<P>,
}

impl<P: JobPlatform + ?Sized> JobReconciler<P> {
    pub fn new(platform: Arc<P>) -> Self {
        Self { platform }
    }

    /// Registers the job, replacing any descriptor with the same effective name.
    ///
    /// # Errors
    ///
    /// Returns `TargetNotFound` if the job's URL does not resolve to a site in
    /// `scope`. Nothing is deleted in that case.
    pub async fn create(&self, spec: &JobSpec, scope: &str) -> Result<JobDescriptor> {
        let site = self.resolve_target(spec, scope).await?;
        let name = spec.effective_name();

        let removed = self.platform.delete_job(scope, &name).await?;
        if removed > 0 {
            debug!(scope = %scope, job = %name, removed, "Removed stale job descriptors");
        }

        let descriptor = materialize(spec);
        self.platform
            .register_job(scope, descriptor.clone())
            .await?;

        info!(
            scope = %scope,
            job = %descriptor.name,
            site = %site.url,
            schedule = %descriptor.schedule,
            method = %spec.method(),
            "Job registered"
        );
        Ok(descriptor)
    }

    /// Deletes every descriptor registered under the job's effective name.
    ///
    /// Returns how many were removed; zero is not an error.
    pub async fn remove(&self, spec: &JobSpec, scope: &str) -> Result<usize> {
        self.resolve_target(spec, scope).await?;
        let name = spec.effective_name();

        let removed = self.platform.delete_job(scope, &name).await?;
        info!(scope = %scope, job = %name, removed, "Job removed");
        Ok(removed)
    }

    /// Descriptors currently registered under the job's effective name.
    pub async fn find(&self, spec: &JobSpec, scope: &str) -> Result<Vec<JobDescriptor>> {
        let name = spec.effective_name();
        Ok(self
            .platform
            .list_jobs(scope)
            .await?
            .into_iter()
            .filter(|job| job.name == name)
            .collect())
    }

    async fn resolve_target(&self, spec: &JobSpec, scope: &str) -> Result<SiteHandle> {
        self.platform
            .resolve_site(scope, spec.url())
            .await?
            .ok_or_else(|| ReconcileError::target_not_found(spec.url(), scope))
    }
}
