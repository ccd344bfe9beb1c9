//! Group reconciler settings.

use serde::{Deserialize, Serialize};

/// What to do when the group already holds the role it is being bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleAssignmentPolicy {
    /// Skip the binding if an identical assignment exists.
    #[default]
    Dedupe,
    /// Always append a new assignment, one per configure pass.
    Append,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSettings {
    #[serde(default)]
    pub role_assignment_policy: RoleAssignmentPolicy,

    /// Profile property read by member email queries.
    #[serde(default = "default_contact_property")]
    pub contact_property: String,
}

fn default_contact_property() -> String {
    "WorkEmail".into()
}

impl Default for GroupSettings {
    fn default() -> Self {
        Self {
            role_assignment_policy: RoleAssignmentPolicy::default(),
            contact_property: default_contact_property(),
        }
    }
}

impl GroupSettings {
    pub fn validate(&self) -> Result<(), String> {
        if self.contact_property.trim().is_empty() {
            return Err("groups.contact_property must not be empty".into());
        }
        Ok(())
    }
}
