use std::sync::Arc;

use anyhow::{Context, Result};
use sitesmith_db_memory::InMemoryPlatform;
use sitesmith_groups::{GroupReconciler, GroupSettings};
use sitesmith_jobs::JobReconciler;
use tracing::info;

use crate::manifest::Manifest;
use crate::output::ReportRow;

/// Seeds missing scopes, then reconciles groups and jobs in manifest order.
///
/// Stops at the first failing entry. Entries already reconciled stay applied.
pub async fn apply(
    platform: &Arc<InMemoryPlatform>,
    manifest: &Manifest,
    settings: &GroupSettings,
) -> Result<Vec<ReportRow>> {
    let mut rows = Vec::new();

    for entry in &manifest.scopes {
        let outcome = if platform.scope(&entry.name).is_some() {
            "exists"
        } else {
            platform.insert_scope(&entry.name, entry.to_state());
            info!(scope = %entry.name, sites = entry.sites.len(), "Scope seeded");
            "created"
        };
        rows.push(ReportRow::new("scope", &entry.name, &entry.name, outcome));
    }

    let groups = GroupReconciler::with_settings(platform.clone(), settings.clone());
    for entry in &manifest.groups {
        let scope = manifest.scope_for(entry.scope.as_deref(), &entry.name)?;
        let spec = entry.to_spec()?;
        let mode = entry.create_mode.unwrap_or(manifest.create_mode);
        let outcome = groups
            .create(&spec, scope, mode)
            .await
            .with_context(|| format!("group '{}'", entry.name))?;
        rows.push(ReportRow::new("group", scope, spec.name(), outcome.as_str()));
    }

    let jobs = JobReconciler::new(platform.clone());
    for entry in &manifest.jobs {
        let scope = manifest.scope_for(entry.scope.as_deref(), &entry.name)?;
        let spec = entry.to_spec()?;
        let descriptor = jobs
            .create(&spec, scope)
            .await
            .with_context(|| format!("job '{}'", entry.name))?;
        rows.push(ReportRow::new("job", scope, descriptor.name, "registered"));
    }

    Ok(rows)
}

/// Removes jobs, then groups. Groups that do not exist are reported as
/// absent rather than failing the run.
pub async fn remove(
    platform: &Arc<InMemoryPlatform>,
    manifest: &Manifest,
    settings: &GroupSettings,
) -> Result<Vec<ReportRow>> {
    let mut rows = Vec::new();

    let jobs = JobReconciler::new(platform.clone());
    for entry in &manifest.jobs {
        let scope = manifest.scope_for(entry.scope.as_deref(), &entry.name)?;
        let spec = entry.to_spec()?;
        let removed = jobs
            .remove(&spec, scope)
            .await
            .with_context(|| format!("job '{}'", entry.name))?;
        rows.push(ReportRow::new(
            "job",
            scope,
            spec.effective_name(),
            format!("removed ({removed})"),
        ));
    }

    let groups = GroupReconciler::with_settings(platform.clone(), settings.clone());
    for entry in &manifest.groups {
        let scope = manifest.scope_for(entry.scope.as_deref(), &entry.name)?;
        let spec = entry.to_spec()?;
        let outcome = match groups.remove(&spec, scope).await {
            Ok(()) => "removed",
            Err(e) if e.is_not_found() => "absent",
            Err(e) => return Err(e).with_context(|| format!("group '{}'", entry.name)),
        };
        rows.push(ReportRow::new("group", scope, spec.name(), outcome));
    }

    Ok(rows)
}
