//! Runs registered job descriptors.

use std::sync::Arc;
use std::time::Instant;

use sitesmith_core::{JobDescriptor, JobPlatform, ReconcileError, Result};
use tracing::{debug, error, info};

use crate::method::MethodRef;
use crate::registry::JobRegistry;

/// Resolves a descriptor's method binding and target site, then runs it.
pub struct JobExecutor<P: JobPlatform + ?Sized> {
    platform: Arc<P>,
    registry: Arc<JobRegistry>,
}

impl<P: JobPlatform + ?Sized> JobExecutor<P> {
    pub fn new(platform: Arc<P>, registry: Arc<JobRegistry>) -> Self {
        Self { platform, registry }
    }

    pub fn registry(&self) -> &JobRegistry {
        &self.registry
    }

    /// Executes one descriptor against its site.
    ///
    /// # Errors
    ///
    /// - `TargetNotFound` if the site no longer resolves.
    /// - `HandlerNotRegistered` if no method is registered for the binding.
    /// - `JobFailed` if the job body returns an error.
    pub async fn execute(&self, descriptor: &JobDescriptor, scope: &str) -> Result<()> {
        let site = self
            .platform
            .resolve_site(scope, &descriptor.url)
            .await?
            .ok_or_else(|| ReconcileError::target_not_found(&descriptor.url, scope))?;

        let binding = MethodRef::new(&descriptor.declaring_type, &descriptor.method_name);
        let invoker = self.registry.get(&binding).ok_or_else(|| {
            ReconcileError::handler_not_registered(&binding.declaring_type, &binding.method_name)
        })?;

        debug!(scope = %scope, job = %descriptor.name, method = %binding, "Executing job");
        let started = Instant::now();

        match invoker(site).await {
            Ok(()) => {
                info!(
                    scope = %scope,
                    job = %descriptor.name,
                    duration_ms = started.elapsed().as_millis() as u64,
                    "Job completed"
                );
                Ok(())
            }
            Err(e) => {
                error!(
                    scope = %scope,
                    job = %descriptor.name,
                    error = %e,
                    "Job failed"
                );
                Err(ReconcileError::job_failed(&descriptor.name, e.to_string()))
            }
        }
    }

    /// Looks a descriptor up by its registered name and executes it.
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if no descriptor has that name.
    pub async fn execute_by_name(&self, scope: &str, name: &str) -> Result<()> {
        let descriptor = self
            .platform
            .list_jobs(scope)
            .await?
            .into_iter()
            .find(|job| job.name == name)
            .ok_or_else(|| ReconcileError::resource_not_found("job", name, scope))?;
        self.execute(&descriptor, scope).await
    }
}
