//! Desired-state description of an access group.

use serde::Serialize;
use sitesmith_core::{ReconcileError, Result, RoleType};

// =============================================================================
// Group Spec
// =============================================================================

/// Desired state of a principal group within a scope.
///
/// The group's identity is its `name`; reconciliation guarantees at most one
/// group with that name per scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupSpec {
    name: String,
    description: String,
    role_type: RoleType,
    owner_account_name: Option<String>,
    initial_user_account_names: Vec<String>,
}

impl GroupSpec {
    /// Creates a new group spec builder.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> GroupSpecBuilder {
        GroupSpecBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn role_type(&self) -> RoleType {
        self.role_type
    }

    /// Declared owner, or `None` when the scope's author should own the group.
    pub fn owner_account_name(&self) -> Option<&str> {
        self.owner_account_name.as_deref()
    }

    /// Declared members in order.
    ///
    /// The first entry is the default member used when the group is created;
    /// the remaining entries are added while configuring.
    pub fn initial_user_account_names(&self) -> &[String] {
        &self.initial_user_account_names
    }

    /// Account the group is created with, or `None` for the scope's author.
    pub fn default_member_account_name(&self) -> Option<&str> {
        self.initial_user_account_names.first().map(String::as_str)
    }
}

// =============================================================================
// Group Spec Builder
// =============================================================================

/// Builder for [`GroupSpec`].
pub struct GroupSpecBuilder {
    spec: GroupSpec,
}

impl GroupSpecBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            spec: GroupSpec {
                name: name.into(),
                description: String::new(),
                role_type: RoleType::default(),
                owner_account_name: None,
                initial_user_account_names: Vec::new(),
            },
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.spec.description = description.into();
        self
    }

    #[must_use]
    pub fn role_type(mut self, role_type: RoleType) -> Self {
        self.spec.role_type = role_type;
        self
    }

    /// Sets the owner. An empty account name means "use the scope's author".
    #[must_use]
    pub fn owner(mut self, account_name: impl Into<String>) -> Self {
        let account_name = account_name.into();
        self.spec.owner_account_name = (!account_name.trim().is_empty()).then_some(account_name);
        self
    }

    /// Appends a member. Blank account names are skipped.
    #[must_use]
    pub fn member(mut self, account_name: impl Into<String>) -> Self {
        let account_name = account_name.into();
        if !account_name.trim().is_empty() {
            self.spec.initial_user_account_names.push(account_name);
        }
        self
    }

    #[must_use]
    pub fn members<I, S>(self, account_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        account_names
            .into_iter()
            .fold(self, |builder, name| builder.member(name))
    }

    /// Builds the [`GroupSpec`].
    ///
    /// # Errors
    ///
    /// Returns `InvalidDescriptor` if the name is empty.
    pub fn build(self) -> Result<GroupSpec> {
        if self.spec.name.trim().is_empty() {
            return Err(ReconcileError::invalid_descriptor(
                "group name must not be empty",
            ));
        }
        Ok(self.spec)
    }
}
