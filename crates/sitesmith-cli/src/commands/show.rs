use std::sync::Arc;

use anyhow::{Result, anyhow};
use colored::Colorize;
use sitesmith_db_memory::{InMemoryPlatform, ScopeState};
use sitesmith_groups::{GroupReconciler, GroupSettings, GroupSpec};

use crate::output::table;

/// Renders the groups and jobs of one scope.
pub fn render_scope(name: &str, state: &ScopeState) -> String {
    let mut out = format!("{} {}\n", "Scope:".cyan(), name);

    let groups = state
        .groups
        .iter()
        .map(|group| {
            let roles: Vec<&str> = state
                .assignments_for(group.id)
                .flat_map(|a| a.role_definition_ids.iter())
                .filter_map(|id| state.role_definitions.iter().find(|d| d.id == *id))
                .map(|d| d.name.as_str())
                .collect();
            [
                group.name.clone(),
                group.owner.login_name.clone(),
                group.members.len().to_string(),
                roles.join(", "),
            ]
        })
        .collect();
    match table(["Group", "Owner", "Members", "Roles"], groups) {
        Some(rendered) => out.push_str(&rendered),
        None => out.push_str("No groups."),
    }
    out.push('\n');

    let jobs = state
        .jobs
        .iter()
        .map(|job| {
            [
                job.name.clone(),
                job.schedule.clone(),
                format!("{}::{}", job.declaring_type, job.method_name),
            ]
        })
        .collect();
    match table(["Job", "Schedule", "Method"], jobs) {
        Some(rendered) => out.push_str(&rendered),
        None => out.push_str("No jobs."),
    }
    out
}

pub fn show(platform: &InMemoryPlatform, scope: Option<&str>) -> Result<()> {
    let names = match scope {
        Some(scope) => vec![scope.to_string()],
        None => platform.scope_names(),
    };
    if names.is_empty() {
        println!("No scopes.");
    }
    for name in names {
        let state = platform
            .scope(&name)
            .ok_or_else(|| anyhow!("unknown scope: {name}"))?;
        println!("{}", render_scope(&name, &state));
    }
    Ok(())
}

/// Member contact emails, or corp ids when `emails` is false.
pub async fn members(
    platform: &Arc<InMemoryPlatform>,
    settings: &GroupSettings,
    scope: &str,
    group: &str,
    emails: bool,
) -> Result<Vec<String>> {
    let reconciler = GroupReconciler::with_settings(platform.clone(), settings.clone());
    let spec = GroupSpec::builder(group).build()?;
    let members = if emails {
        reconciler.member_emails(&spec, scope).await?
    } else {
        reconciler.member_corp_ids(&spec, scope).await?
    };
    Ok(members)
}
