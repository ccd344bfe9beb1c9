use async_trait::async_trait;
use dashmap::{DashMap, DashSet};
use sitesmith_core::{
    GroupRecord, GroupStore, JobDescriptor, NewGroup, PlatformError, PlatformResult, Principal,
    PrincipalStore, Profile, ProfileDirectory, RoleAssignment, RoleDefinition, RoleStore,
    SchedulerHost, ScopeStore, SiteDirectory, SiteHandle,
};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::state::{PlatformSnapshot, ScopeState};

/// Operations a one-shot failure can be armed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailPoint {
    AddGroup,
    UpdateGroup,
    RemoveGroup,
    AddRoleAssignment,
    UpdateScope,
    RegisterJob,
    DeleteJob,
}

impl FailPoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailPoint::AddGroup => "add_group",
            FailPoint::UpdateGroup => "update_group",
            FailPoint::RemoveGroup => "remove_group",
            FailPoint::AddRoleAssignment => "add_role_assignment",
            FailPoint::UpdateScope => "update_scope",
            FailPoint::RegisterJob => "register_job",
            FailPoint::DeleteJob => "delete_job",
        }
    }
}

/// In-memory platform backend.
///
/// Implements every collaborator trait from `sitesmith-core` over
/// [`DashMap`]s. Besides tests it backs the CLI, which round-trips it through
/// a [`PlatformSnapshot`] file.
///
/// Structural changes follow the real platform's rules: adding a group
/// requires the scope's unsafe-update flag to be on, and group names are
/// unique per scope.
#[derive(Debug, Default)]
pub struct InMemoryPlatform {
    scopes: DashMap<String, ScopeState>,
    profiles: DashMap<String, Profile>,
    fail_points: DashSet<FailPoint>,
}

impl InMemoryPlatform {
    /// Creates an empty platform.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores a platform from a snapshot.
    pub fn from_snapshot(snapshot: PlatformSnapshot) -> Self {
        let platform = Self::new();
        for (name, state) in snapshot.scopes {
            platform.scopes.insert(name, state);
        }
        for (account, profile) in snapshot.profiles {
            platform.profiles.insert(account, profile);
        }
        platform
    }

    /// Copies the current state out.
    pub fn snapshot(&self) -> PlatformSnapshot {
        PlatformSnapshot {
            scopes: self
                .scopes
                .iter()
                .map(|e| (e.key().clone(), e.value().clone()))
                .collect(),
            profiles: self
                .profiles
                .iter()
                .map(|e| (e.key().clone(), e.value().clone()))
                .collect(),
        }
    }

    /// Adds or replaces a scope.
    pub fn insert_scope(&self, name: impl Into<String>, state: ScopeState) {
        self.scopes.insert(name.into(), state);
    }

    /// Adds or replaces a directory profile.
    pub fn insert_profile(&self, profile: Profile) {
        self.profiles.insert(profile.account_name.clone(), profile);
    }

    /// Returns a copy of a scope's state.
    pub fn scope(&self, name: &str) -> Option<ScopeState> {
        self.scopes.get(name).map(|s| s.clone())
    }

    /// Lists the known scope names.
    pub fn scope_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.scopes.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Arms a failure for the next call of `point`.
    pub fn fail_once(&self, point: FailPoint) {
        self.fail_points.insert(point);
    }

    fn check_fail(&self, point: FailPoint) -> PlatformResult<()> {
        if self.fail_points.remove(&point).is_some() {
            warn!(operation = point.as_str(), "Injected failure fired");
            return Err(PlatformError::injected(point.as_str()));
        }
        Ok(())
    }

    fn read<R>(&self, scope: &str, f: impl FnOnce(&ScopeState) -> R) -> PlatformResult<R> {
        let state = self
            .scopes
            .get(scope)
            .ok_or_else(|| PlatformError::scope_not_found(scope))?;
        Ok(f(&state))
    }

    fn write<R>(
        &self,
        scope: &str,
        f: impl FnOnce(&mut ScopeState) -> PlatformResult<R>,
    ) -> PlatformResult<R> {
        let mut state = self
            .scopes
            .get_mut(scope)
            .ok_or_else(|| PlatformError::scope_not_found(scope))?;
        f(&mut state)
    }

    fn ensure_principal_in(state: &mut ScopeState, account: &str) -> Principal {
        if let Some(existing) = state.principals.iter().find(|p| p.login_name == account) {
            return existing.clone();
        }
        let principal = Principal::new(account);
        state.principals.push(principal.clone());
        principal
    }
}

#[async_trait]
impl ProfileDirectory for InMemoryPlatform {
    async fn profile_exists(&self, _scope: &str, account: &str) -> PlatformResult<bool> {
        Ok(self.profiles.contains_key(account))
    }

    async fn get_profile(&self, _scope: &str, account: &str) -> PlatformResult<Option<Profile>> {
        Ok(self.profiles.get(account).map(|p| p.clone()))
    }
}

#[async_trait]
impl PrincipalStore for InMemoryPlatform {
    async fn ensure_principal(&self, scope: &str, account: &str) -> PlatformResult<Principal> {
        self.write(scope, |state| Ok(Self::ensure_principal_in(state, account)))
    }

    async fn ambient_author(&self, scope: &str) -> PlatformResult<Principal> {
        self.write(scope, |state| {
            let author = state.author.clone();
            Ok(Self::ensure_principal_in(state, &author))
        })
    }
}

#[async_trait]
impl GroupStore for InMemoryPlatform {
    async fn list_groups(&self, scope: &str) -> PlatformResult<Vec<GroupRecord>> {
        self.read(scope, |state| state.groups.clone())
    }

    async fn add_group(&self, scope: &str, group: NewGroup) -> PlatformResult<()> {
        self.check_fail(FailPoint::AddGroup)?;
        self.write(scope, |state| {
            if !state.allow_unsafe_updates {
                return Err(PlatformError::storage(format!(
                    "unsafe updates are not allowed in scope {scope}"
                )));
            }
            if state.group(&group.name).is_some() {
                return Err(PlatformError::storage(format!(
                    "group {} already exists in scope {scope}",
                    group.name
                )));
            }
            debug!(scope = %scope, group = %group.name, "Group added");
            state.groups.push(GroupRecord {
                id: Uuid::new_v4(),
                name: group.name,
                description: group.description,
                owner: group.owner,
                members: vec![group.default_member],
            });
            Ok(())
        })
    }

    async fn update_group(&self, scope: &str, group: &GroupRecord) -> PlatformResult<()> {
        self.check_fail(FailPoint::UpdateGroup)?;
        self.write(scope, |state| {
            let slot = state
                .groups
                .iter_mut()
                .find(|g| g.id == group.id)
                .ok_or_else(|| PlatformError::storage(format!("group {} not found", group.id)))?;
            *slot = group.clone();
            Ok(())
        })
    }

    async fn remove_group(&self, scope: &str, group_id: Uuid) -> PlatformResult<()> {
        self.check_fail(FailPoint::RemoveGroup)?;
        self.write(scope, |state| {
            let before = state.groups.len();
            state.groups.retain(|g| g.id != group_id);
            if state.groups.len() == before {
                return Err(PlatformError::storage(format!("group {group_id} not found")));
            }
            Ok(())
        })
    }
}

#[async_trait]
impl RoleStore for InMemoryPlatform {
    async fn role_definitions(&self, scope: &str) -> PlatformResult<Vec<RoleDefinition>> {
        self.read(scope, |state| state.role_definitions.clone())
    }

    async fn role_assignments(&self, scope: &str) -> PlatformResult<Vec<RoleAssignment>> {
        self.read(scope, |state| state.role_assignments.clone())
    }

    async fn add_role_assignment(
        &self,
        scope: &str,
        assignment: RoleAssignment,
    ) -> PlatformResult<()> {
        self.check_fail(FailPoint::AddRoleAssignment)?;
        self.write(scope, |state| {
            state.role_assignments.push(assignment);
            Ok(())
        })
    }

    async fn remove_role_assignments(
        &self,
        scope: &str,
        principal_id: Uuid,
    ) -> PlatformResult<usize> {
        self.write(scope, |state| {
            let before = state.role_assignments.len();
            state
                .role_assignments
                .retain(|a| a.principal_id != principal_id);
            Ok(before - state.role_assignments.len())
        })
    }
}

#[async_trait]
impl ScopeStore for InMemoryPlatform {
    async fn update_scope(&self, scope: &str) -> PlatformResult<()> {
        self.check_fail(FailPoint::UpdateScope)?;
        self.write(scope, |state| {
            state.scope_updates += 1;
            Ok(())
        })
    }

    fn allow_unsafe_updates(&self, scope: &str) -> bool {
        self.scopes
            .get(scope)
            .map(|s| s.allow_unsafe_updates)
            .unwrap_or(false)
    }

    fn set_allow_unsafe_updates(&self, scope: &str, allow: bool) {
        match self.scopes.get_mut(scope) {
            Some(mut state) => state.allow_unsafe_updates = allow,
            None => warn!(scope = %scope, "Unsafe-update flag set on unknown scope"),
        }
    }
}

#[async_trait]
impl SiteDirectory for InMemoryPlatform {
    async fn resolve_site(&self, scope: &str, url: &str) -> PlatformResult<Option<SiteHandle>> {
        self.read(scope, |state| {
            state.sites.iter().any(|s| s == url).then(|| SiteHandle {
                url: url.to_string(),
                scope: scope.to_string(),
            })
        })
    }
}

#[async_trait]
impl SchedulerHost for InMemoryPlatform {
    async fn list_jobs(&self, scope: &str) -> PlatformResult<Vec<JobDescriptor>> {
        self.read(scope, |state| state.jobs.clone())
    }

    async fn register_job(&self, scope: &str, descriptor: JobDescriptor) -> PlatformResult<()> {
        self.check_fail(FailPoint::RegisterJob)?;
        self.write(scope, |state| {
            state.jobs.push(descriptor);
            Ok(())
        })
    }

    async fn delete_job(&self, scope: &str, name: &str) -> PlatformResult<usize> {
        self.check_fail(FailPoint::DeleteJob)?;
        self.write(scope, |state| {
            let before = state.jobs.len();
            state.jobs.retain(|j| j.name != name);
            Ok(before - state.jobs.len())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn platform() -> InMemoryPlatform {
        let platform = InMemoryPlatform::new();
        platform.insert_scope(
            "web",
            ScopeState::new("CORP\\author")
                .with_default_roles()
                .with_site("https://site/a"),
        );
        platform
    }

    #[tokio::test]
    async fn test_ensure_principal_is_stable() {
        let platform = platform();
        let first = platform.ensure_principal("web", "CORP\\jdoe").await.unwrap();
        let second = platform.ensure_principal("web", "CORP\\jdoe").await.unwrap();
        assert_eq!(first.id, second.id);

        let author = platform.ambient_author("web").await.unwrap();
        assert_eq!(author.login_name, "CORP\\author");
    }

    #[tokio::test]
    async fn test_unknown_scope() {
        let platform = platform();
        let err = platform.list_groups("missing").await.unwrap_err();
        assert!(matches!(err, PlatformError::ScopeNotFound { .. }));
    }

    #[tokio::test]
    async fn test_add_group_requires_unsafe_updates() {
        let platform = platform();
        let owner = platform.ambient_author("web").await.unwrap();
        let new_group = NewGroup {
            name: "Readers".into(),
            description: String::new(),
            owner: owner.clone(),
            default_member: owner,
        };

        assert!(platform.add_group("web", new_group.clone()).await.is_err());

        platform.set_allow_unsafe_updates("web", true);
        platform.add_group("web", new_group.clone()).await.unwrap();

        // Names are unique per scope.
        assert!(platform.add_group("web", new_group).await.is_err());
    }

    #[tokio::test]
    async fn test_fail_point_fires_once() {
        let platform = platform();
        platform.fail_once(FailPoint::UpdateScope);

        assert!(matches!(
            platform.update_scope("web").await,
            Err(PlatformError::Injected { .. })
        ));
        platform.update_scope("web").await.unwrap();
        assert_eq!(platform.scope("web").unwrap().scope_updates, 1);
    }

    #[tokio::test]
    async fn test_jobs_delete_by_name() {
        let platform = platform();
        let job = JobDescriptor {
            name: "cleanup_https://site/a".into(),
            ..JobDescriptor::default()
        };
        platform.register_job("web", job.clone()).await.unwrap();
        platform.register_job("web", job).await.unwrap();

        assert_eq!(
            platform.delete_job("web", "cleanup_https://site/a").await.unwrap(),
            2
        );
        assert!(platform.list_jobs("web").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_snapshot_round_trip() {
        let platform = platform();
        platform.insert_profile(Profile::new("CORP\\a").with_property("WorkEmail", "a@x"));
        platform.ensure_principal("web", "CORP\\a").await.unwrap();

        let restored = InMemoryPlatform::from_snapshot(platform.snapshot());
        assert_eq!(restored.snapshot(), platform.snapshot());
        assert!(restored.profile_exists("web", "CORP\\a").await.unwrap());
    }
}
