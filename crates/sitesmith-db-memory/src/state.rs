//! Serializable platform state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sitesmith_core::{
    GroupRecord, JobDescriptor, Principal, Profile, RoleAssignment, RoleDefinition, RoleType,
};

/// State of a single scope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScopeState {
    /// Login name of the account that authored the scope.
    pub author: String,

    #[serde(default)]
    pub principals: Vec<Principal>,

    #[serde(default)]
    pub groups: Vec<GroupRecord>,

    /// Kept in enumeration order.
    #[serde(default)]
    pub role_definitions: Vec<RoleDefinition>,

    #[serde(default)]
    pub role_assignments: Vec<RoleAssignment>,

    /// Urls of live sites.
    #[serde(default)]
    pub sites: Vec<String>,

    #[serde(default)]
    pub jobs: Vec<JobDescriptor>,

    #[serde(default)]
    pub allow_unsafe_updates: bool,

    /// Number of times the scope itself was persisted.
    #[serde(default)]
    pub scope_updates: u64,
}

impl ScopeState {
    /// Creates an empty scope authored by `author`.
    #[must_use]
    pub fn new(author: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            ..Self::default()
        }
    }

    /// Adds the platform's standard permission levels.
    #[must_use]
    pub fn with_default_roles(mut self) -> Self {
        for (name, role_type) in [
            ("Full Control", RoleType::Administrator),
            ("Design", RoleType::WebDesigner),
            ("Edit", RoleType::Editor),
            ("Contribute", RoleType::Contributor),
            ("Read", RoleType::Reader),
            ("Limited Access", RoleType::Guest),
        ] {
            self.role_definitions.push(RoleDefinition::new(name, role_type));
        }
        self
    }

    #[must_use]
    pub fn with_role_definition(mut self, definition: RoleDefinition) -> Self {
        self.role_definitions.push(definition);
        self
    }

    #[must_use]
    pub fn with_site(mut self, url: impl Into<String>) -> Self {
        self.sites.push(url.into());
        self
    }

    /// Returns the group with the given name.
    #[must_use]
    pub fn group(&self, name: &str) -> Option<&GroupRecord> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// Returns the assignments held by a principal.
    pub fn assignments_for(
        &self,
        principal_id: uuid::Uuid,
    ) -> impl Iterator<Item = &RoleAssignment> {
        self.role_assignments
            .iter()
            .filter(move |a| a.principal_id == principal_id)
    }
}

/// Point-in-time copy of the whole platform.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlatformSnapshot {
    #[serde(default)]
    pub scopes: BTreeMap<String, ScopeState>,

    /// Directory profiles keyed by account name.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}
