//! Collaborator traits for the external platform.
//!
//! The reconcilers never talk to a concrete platform. Each concern the
//! platform offers is a narrow trait here; `sitesmith-db-memory` provides an
//! in-memory implementation of all of them.
//!
//! Every `scope` argument is the name of the site-collection/web context
//! within which group and job identities are unique.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::PlatformResult;
use crate::model::{
    GroupRecord, JobDescriptor, NewGroup, Principal, Profile, RoleAssignment, RoleDefinition,
    SiteHandle,
};

// =============================================================================
// Directory
// =============================================================================

/// Read access to the user profile directory.
#[async_trait]
pub trait ProfileDirectory: Send + Sync {
    /// Returns `true` if a profile exists for the account.
    async fn profile_exists(&self, scope: &str, account: &str) -> PlatformResult<bool>;

    /// Fetches the profile for the account.
    ///
    /// Returns `None` if the account has no profile.
    async fn get_profile(&self, scope: &str, account: &str) -> PlatformResult<Option<Profile>>;
}

/// Principal resolution within a scope.
#[async_trait]
pub trait PrincipalStore: Send + Sync {
    /// Resolves the account to a principal, provisioning a reference if needed.
    ///
    /// Never fails for a syntactically valid account name.
    async fn ensure_principal(&self, scope: &str, account: &str) -> PlatformResult<Principal>;

    /// The account that authored the scope, used when no owner or member is declared.
    async fn ambient_author(&self, scope: &str) -> PlatformResult<Principal>;
}

// =============================================================================
// Groups and Roles
// =============================================================================

/// Named groups per scope.
#[async_trait]
pub trait GroupStore: Send + Sync {
    /// Lists the scope's groups.
    async fn list_groups(&self, scope: &str) -> PlatformResult<Vec<GroupRecord>>;

    /// Finds a group by exact name.
    async fn find_group_by_name(
        &self,
        scope: &str,
        name: &str,
    ) -> PlatformResult<Option<GroupRecord>> {
        Ok(self
            .list_groups(scope)
            .await?
            .into_iter()
            .find(|g| g.name == name))
    }

    /// Registers a new group with its owner and single default member.
    async fn add_group(&self, scope: &str, group: NewGroup) -> PlatformResult<()>;

    /// Persists description, owner and membership of an existing group.
    async fn update_group(&self, scope: &str, group: &GroupRecord) -> PlatformResult<()>;

    /// Removes a group by its identifier.
    async fn remove_group(&self, scope: &str, group_id: Uuid) -> PlatformResult<()>;
}

/// Role definitions and role assignments per scope.
#[async_trait]
pub trait RoleStore: Send + Sync {
    /// Lists role definitions in the scope's enumeration order.
    async fn role_definitions(&self, scope: &str) -> PlatformResult<Vec<RoleDefinition>>;

    /// Lists the scope's role assignments.
    async fn role_assignments(&self, scope: &str) -> PlatformResult<Vec<RoleAssignment>>;

    /// Appends a role assignment to the scope's collection.
    async fn add_role_assignment(
        &self,
        scope: &str,
        assignment: RoleAssignment,
    ) -> PlatformResult<()>;

    /// Removes every assignment held by the principal, returning how many went.
    async fn remove_role_assignments(&self, scope: &str, principal_id: Uuid)
    -> PlatformResult<usize>;
}

/// Scope-level state.
///
/// The unsafe-update flag is plain in-process object state, so it is read and
/// written synchronously; see [`crate::guard::UnsafeUpdateGuard`].
#[async_trait]
pub trait ScopeStore: Send + Sync {
    /// Persists pending changes to the scope itself.
    async fn update_scope(&self, scope: &str) -> PlatformResult<()>;

    fn allow_unsafe_updates(&self, scope: &str) -> bool;

    fn set_allow_unsafe_updates(&self, scope: &str, allow: bool);
}

// =============================================================================
// Sites and Scheduler
// =============================================================================

/// Site resolution.
#[async_trait]
pub trait SiteDirectory: Send + Sync {
    /// Resolves `url` to a live site in the scope.
    async fn resolve_site(&self, scope: &str, url: &str) -> PlatformResult<Option<SiteHandle>>;
}

/// The scheduler host that stores and later runs job descriptors.
#[async_trait]
pub trait SchedulerHost: Send + Sync {
    /// Lists registered job descriptors.
    async fn list_jobs(&self, scope: &str) -> PlatformResult<Vec<JobDescriptor>>;

    /// Stores a descriptor.
    async fn register_job(&self, scope: &str, descriptor: JobDescriptor) -> PlatformResult<()>;

    /// Deletes every descriptor with the given name, returning how many went.
    async fn delete_job(&self, scope: &str, name: &str) -> PlatformResult<usize>;
}

// =============================================================================
// Bundles
// =============================================================================

/// Everything the group reconciler needs.
pub trait GroupPlatform:
    ProfileDirectory + PrincipalStore + GroupStore + RoleStore + ScopeStore
{
}

impl<T> GroupPlatform for T where
    T: ProfileDirectory + PrincipalStore + GroupStore + RoleStore + ScopeStore
{
}

/// Everything the job reconciler and executor need.
pub trait JobPlatform: SiteDirectory + SchedulerHost {}

impl<T> JobPlatform for T where T: SiteDirectory + SchedulerHost {}
