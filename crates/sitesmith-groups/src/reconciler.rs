//! Group reconciliation.
//!
//! Converges a scope's groups to a [`GroupSpec`]:
//!
//! ```text
//! GroupSpec → find by name → CreateMode policy → add_group? → configure_group
//! ```
//!
//! Steps are sequential and not atomic. A failure part-way leaves the group
//! partially configured; running `create` again with
//! [`CreateMode::UpdateExisting`] finishes the job.

use std::fmt;
use std::sync::Arc;

use sitesmith_core::{
    CreateMode, GroupPlatform, GroupRecord, NewGroup, Principal, ReconcileError, Result,
    RoleAssignment, RoleDefinition, RoleType, UnsafeUpdateGuard,
};
use tracing::{debug, info};

use crate::group::GroupSpec;
use crate::login::corp_id;
use crate::settings::{GroupSettings, RoleAssignmentPolicy};

const KIND: &str = "group";

/// What `create` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupOutcome {
    /// The group existed and the create mode said to leave it alone.
    Ignored,
    /// The group did not exist and was created and configured.
    Created,
    /// The existing group was dropped and recreated.
    Replaced,
    /// The existing group was reconfigured in place.
    Updated,
}

impl GroupOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupOutcome::Ignored => "ignored",
            GroupOutcome::Created => "created",
            GroupOutcome::Replaced => "replaced",
            GroupOutcome::Updated => "updated",
        }
    }
}

impl fmt::Display for GroupOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reconciles [`GroupSpec`]s against a platform.
pub struct GroupReconciler<P: GroupPlatform + ?Sized> {
    platform: Arc<P>,
    settings: GroupSettings,
}

impl<P: GroupPlatform + ?Sized> GroupReconciler<P> {
    /// Creates a reconciler with default settings.
    pub fn new(platform: Arc<P>) -> Self {
        Self::with_settings(platform, GroupSettings::default())
    }

    pub fn with_settings(platform: Arc<P>, settings: GroupSettings) -> Self {
        Self { platform, settings }
    }

    pub fn settings(&self) -> &GroupSettings {
        &self.settings
    }

    /// Looks the group up by name.
    ///
    /// Returns `None` if the scope has no such group; callers that want to
    /// tolerate removing an absent group check this first.
    pub async fn find(&self, spec: &GroupSpec, scope: &str) -> Result<Option<GroupRecord>> {
        let group = self
            .platform
            .find_group_by_name(scope, spec.name())
            .await?;
        debug!(scope = %scope, group = %spec.name(), found = group.is_some(), "Group lookup");
        Ok(group)
    }

    async fn require(&self, spec: &GroupSpec, scope: &str) -> Result<GroupRecord> {
        self.find(spec, scope)
            .await?
            .ok_or_else(|| ReconcileError::resource_not_found(KIND, spec.name(), scope))
    }

    /// Creates or reconciles the group according to `mode`.
    ///
    /// - `IgnoreExisting` - an existing group is left untouched.
    /// - `ReplaceExisting` - an existing group is removed with its role
    ///   assignments, then created and configured afresh.
    /// - `UpdateExisting` - an existing group is reconfigured; its default
    ///   member is kept.
    ///
    /// A missing group is always created and configured.
    pub async fn create(
        &self,
        spec: &GroupSpec,
        scope: &str,
        mode: CreateMode,
    ) -> Result<GroupOutcome> {
        let existing = self.find(spec, scope).await?;

        let (group, outcome) = match (existing, mode) {
            (Some(_), CreateMode::IgnoreExisting) => {
                debug!(scope = %scope, group = %spec.name(), "Group exists, ignoring");
                return Ok(GroupOutcome::Ignored);
            }
            (Some(existing), CreateMode::ReplaceExisting) => {
                self.remove_record(scope, &existing).await?;
                (self.add_group(spec, scope).await?, GroupOutcome::Replaced)
            }
            (Some(existing), CreateMode::UpdateExisting) => (existing, GroupOutcome::Updated),
            (None, _) => (self.add_group(spec, scope).await?, GroupOutcome::Created),
        };

        self.configure_group(spec, scope, group).await?;

        info!(
            scope = %scope,
            group = %spec.name(),
            mode = %mode,
            outcome = %outcome,
            "Group reconciled"
        );
        Ok(outcome)
    }

    /// Removes the group from the scope.
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the group does not exist.
    pub async fn remove(&self, spec: &GroupSpec, scope: &str) -> Result<()> {
        let group = self.require(spec, scope).await?;
        self.remove_record(scope, &group).await
    }

    async fn remove_record(&self, scope: &str, group: &GroupRecord) -> Result<()> {
        let assignments = self
            .platform
            .remove_role_assignments(scope, group.id)
            .await?;
        self.platform.remove_group(scope, group.id).await?;
        self.platform.update_scope(scope).await?;

        info!(
            scope = %scope,
            group = %group.name,
            group_id = %group.id,
            assignments,
            "Group removed"
        );
        Ok(())
    }

    /// Registers a fresh group with its owner and default member.
    async fn add_group(&self, spec: &GroupSpec, scope: &str) -> Result<GroupRecord> {
        {
            let _unsafe_updates = UnsafeUpdateGuard::acquire(self.platform.as_ref(), scope);

            let owner = self.resolve_owner(spec, scope).await?;
            let default_member = match spec.default_member_account_name() {
                Some(account) => self.platform.ensure_principal(scope, account).await?,
                None => self.platform.ambient_author(scope).await?,
            };

            debug!(
                scope = %scope,
                group = %spec.name(),
                owner = %owner.login_name,
                default_member = %default_member.login_name,
                "Adding group"
            );

            self.platform
                .add_group(
                    scope,
                    NewGroup {
                        name: spec.name().to_string(),
                        description: spec.description().to_string(),
                        owner,
                        default_member,
                    },
                )
                .await?;
        }

        self.platform.update_scope(scope).await?;
        self.require(spec, scope).await
    }

    async fn configure_group(
        &self,
        spec: &GroupSpec,
        scope: &str,
        mut group: GroupRecord,
    ) -> Result<()> {
        let definition = self.select_role_definition(spec.role_type(), scope).await?;
        self.bind_role(scope, &group, &definition).await?;

        group.description = spec.description().to_string();
        group.owner = self.resolve_owner(spec, scope).await?;

        for account in spec.initial_user_account_names() {
            let user = self.platform.ensure_principal(scope, account).await?;
            if group.has_member_id(user.id) || group.has_member_login(&user.login_name) {
                continue;
            }
            debug!(scope = %scope, group = %group.name, member = %user.login_name, "Adding member");
            group.members.push(user);
        }

        self.platform.update_group(scope, &group).await?;
        self.platform.update_scope(scope).await?;
        Ok(())
    }

    /// Picks the role definition for `role_type`.
    ///
    /// When several definitions share the type, the last one in the scope's
    /// enumeration order wins.
    async fn select_role_definition(
        &self,
        role_type: RoleType,
        scope: &str,
    ) -> Result<RoleDefinition> {
        self.platform
            .role_definitions(scope)
            .await?
            .into_iter()
            .rev()
            .find(|d| d.role_type == role_type)
            .ok_or_else(|| ReconcileError::role_definition_not_found(role_type.as_str(), scope))
    }

    async fn bind_role(
        &self,
        scope: &str,
        group: &GroupRecord,
        definition: &RoleDefinition,
    ) -> Result<()> {
        if self.settings.role_assignment_policy == RoleAssignmentPolicy::Dedupe {
            let assignments = self.platform.role_assignments(scope).await?;
            if assignments.iter().any(|a| a.binds(group.id, definition.id)) {
                debug!(
                    scope = %scope,
                    group = %group.name,
                    role = %definition.name,
                    "Role already assigned"
                );
                return Ok(());
            }
        }

        self.platform
            .add_role_assignment(scope, RoleAssignment::new(group.id, definition.id))
            .await?;
        debug!(scope = %scope, group = %group.name, role = %definition.name, "Role assigned");
        Ok(())
    }

    async fn resolve_owner(&self, spec: &GroupSpec, scope: &str) -> Result<Principal> {
        let owner = match spec.owner_account_name() {
            Some(account) => self.platform.ensure_principal(scope, account).await?,
            None => self.platform.ambient_author(scope).await?,
        };
        Ok(owner)
    }

    // =========================================================================
    // Member queries
    // =========================================================================

    /// Collects the contact email of every member that has a directory profile.
    ///
    /// Members without a profile, or whose profile lacks the contact property,
    /// contribute nothing. That is expected for service accounts and is not an
    /// error.
    pub async fn member_emails(&self, spec: &GroupSpec, scope: &str) -> Result<Vec<String>> {
        let group = self.require(spec, scope).await?;
        let property = self.settings.contact_property.as_str();
        let mut emails = Vec::new();

        for member in &group.members {
            if !self
                .platform
                .profile_exists(scope, &member.login_name)
                .await?
            {
                debug!(member = %member.login_name, "No profile, skipping");
                continue;
            }
            let Some(profile) = self.platform.get_profile(scope, &member.login_name).await? else {
                continue;
            };
            match profile.property_string(property) {
                Some(email) => emails.push(email),
                None => {
                    debug!(member = %member.login_name, property, "Profile has no contact value")
                }
            }
        }

        Ok(emails)
    }

    /// Returns each member's login with the domain prefix stripped.
    pub async fn member_corp_ids(&self, spec: &GroupSpec, scope: &str) -> Result<Vec<String>> {
        let group = self.require(spec, scope).await?;
        Ok(group
            .members
            .iter()
            .map(|m| corp_id(&m.login_name).to_string())
            .collect())
    }

    /// Adds `principal` to the group unless a member has the same login.
    ///
    /// The login is resolved through the scope's principal store, so the
    /// stored member carries the scope's id for it. Returns `true` if the
    /// principal was added.
    pub async fn ensure_member(
        &self,
        spec: &GroupSpec,
        scope: &str,
        principal: &Principal,
    ) -> Result<bool> {
        let mut group = self.require(spec, scope).await?;
        if group.has_member_login(&principal.login_name) {
            return Ok(false);
        }

        let resolved = self
            .platform
            .ensure_principal(scope, &principal.login_name)
            .await?;
        group.members.push(resolved);
        self.platform.update_group(scope, &group).await?;

        info!(scope = %scope, group = %group.name, member = %principal.login_name, "Member added");
        Ok(true)
    }
}
