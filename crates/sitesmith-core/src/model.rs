//! Records exchanged with the platform.
//!
//! These mirror what the platform's object model hands back. Reconcilers only
//! read them or build new ones; persistence is always done through the
//! collaborator traits in [`crate::platform`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::RoleType;

// =============================================================================
// Principals and Profiles
// =============================================================================

/// A resolvable identity (user or service account) within a scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Principal {
    /// Platform-assigned identifier, stable within the scope.
    pub id: Uuid,

    /// Login identity, usually `DOMAIN\account`.
    pub login_name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl Principal {
    /// Creates a principal with a fresh identifier.
    #[must_use]
    pub fn new(login_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            login_name: login_name.into(),
            display_name: None,
        }
    }
}

/// A directory profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub account_name: String,

    #[serde(default)]
    pub properties: HashMap<String, serde_json::Value>,
}

impl Profile {
    #[must_use]
    pub fn new(account_name: impl Into<String>) -> Self {
        Self {
            account_name: account_name.into(),
            properties: HashMap::new(),
        }
    }

    /// Sets a property value.
    #[must_use]
    pub fn with_property(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Returns a property value, if set.
    #[must_use]
    pub fn property(&self, key: &str) -> Option<&serde_json::Value> {
        self.properties.get(key)
    }

    /// Returns a property rendered as a string.
    ///
    /// Strings are returned verbatim, other scalars via their JSON form.
    /// `null` and missing properties yield `None`.
    #[must_use]
    pub fn property_string(&self, key: &str) -> Option<String> {
        match self.property(key)? {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

// =============================================================================
// Groups and Roles
// =============================================================================

/// A principal group as stored in a scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRecord {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub owner: Principal,
    #[serde(default)]
    pub members: Vec<Principal>,
}

impl GroupRecord {
    /// Returns `true` if a member has the given principal id.
    #[must_use]
    pub fn has_member_id(&self, id: Uuid) -> bool {
        self.members.iter().any(|m| m.id == id)
    }

    /// Returns `true` if a member has the given login name.
    #[must_use]
    pub fn has_member_login(&self, login_name: &str) -> bool {
        self.members.iter().any(|m| m.login_name == login_name)
    }
}

/// Request to register a new group in a scope.
#[derive(Debug, Clone)]
pub struct NewGroup {
    pub name: String,
    pub description: String,
    pub owner: Principal,
    /// The single member the group is created with.
    pub default_member: Principal,
}

/// A named permission level defined in a scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDefinition {
    pub id: Uuid,
    pub name: String,
    pub role_type: RoleType,
}

impl RoleDefinition {
    #[must_use]
    pub fn new(name: impl Into<String>, role_type: RoleType) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            role_type,
        }
    }
}

/// Binding of a principal (user or group) to one or more role definitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssignment {
    pub principal_id: Uuid,
    pub role_definition_ids: Vec<Uuid>,
}

impl RoleAssignment {
    #[must_use]
    pub fn new(principal_id: Uuid, role_definition_id: Uuid) -> Self {
        Self {
            principal_id,
            role_definition_ids: vec![role_definition_id],
        }
    }

    /// Returns `true` if this assignment binds `principal_id` to `role_definition_id`.
    #[must_use]
    pub fn binds(&self, principal_id: Uuid, role_definition_id: Uuid) -> bool {
        self.principal_id == principal_id && self.role_definition_ids.contains(&role_definition_id)
    }
}

// =============================================================================
// Sites and Jobs
// =============================================================================

/// A live site resolved within a scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteHandle {
    pub url: String,
    pub scope: String,
}

/// The persisted record the scheduler host keeps for a registered job.
///
/// Keyed by `name` within a scope. `declaring_type` and `method_name` together
/// identify the handler the host invokes with the resolved site.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDescriptor {
    pub name: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub url: String,
    /// Cron expression understood by the scheduler host.
    pub schedule: String,
    pub declaring_type: String,
    pub method_name: String,
}
