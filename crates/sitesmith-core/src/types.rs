//! Enumerations shared by the reconcilers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ReconcileError;

// =============================================================================
// Role Type
// =============================================================================

/// Standard permission level a group can be granted in a scope.
///
/// Role definitions are matched against this by type, not by display name,
/// so renamed definitions still resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleType {
    None,
    Guest,
    #[default]
    Reader,
    Contributor,
    WebDesigner,
    Administrator,
    Editor,
}

impl RoleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleType::None => "none",
            RoleType::Guest => "guest",
            RoleType::Reader => "reader",
            RoleType::Contributor => "contributor",
            RoleType::WebDesigner => "web_designer",
            RoleType::Administrator => "administrator",
            RoleType::Editor => "editor",
        }
    }
}

impl fmt::Display for RoleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoleType {
    type Err = ReconcileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(RoleType::None),
            "guest" => Ok(RoleType::Guest),
            "reader" => Ok(RoleType::Reader),
            "contributor" => Ok(RoleType::Contributor),
            "web_designer" | "webdesigner" => Ok(RoleType::WebDesigner),
            "administrator" => Ok(RoleType::Administrator),
            "editor" => Ok(RoleType::Editor),
            other => Err(ReconcileError::invalid_descriptor(format!(
                "unknown role type: {other}"
            ))),
        }
    }
}

// =============================================================================
// Create Mode
// =============================================================================

/// Conflict policy applied when the desired group already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreateMode {
    /// Leave an existing group untouched.
    IgnoreExisting,
    /// Drop the existing group with its role assignments and create it anew.
    ReplaceExisting,
    /// Reconfigure the existing group in place, keeping its default member.
    #[default]
    UpdateExisting,
}

impl CreateMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CreateMode::IgnoreExisting => "ignore_existing",
            CreateMode::ReplaceExisting => "replace_existing",
            CreateMode::UpdateExisting => "update_existing",
        }
    }
}

impl fmt::Display for CreateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
