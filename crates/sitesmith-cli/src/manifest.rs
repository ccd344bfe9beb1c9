//! Desired-state manifest read by `apply` and `remove`.
//!
//! ```toml
//! scope = "portal"
//!
//! [[scopes]]
//! name = "portal"
//! author = "CORP\\spadmin"
//! sites = ["https://portal/hr"]
//!
//! [[groups]]
//! name = "HR Readers"
//! role_type = "reader"
//! members = ["CORP\\jdoe"]
//!
//! [[jobs]]
//! name = "Nightly Heartbeat"
//! url = "https://portal/hr"
//! schedule = "0 2 * * *"
//! method = "sitesmith::builtin::SiteHeartbeat::run"
//! ```

use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use sitesmith_core::{CreateMode, RoleType};
use sitesmith_db_memory::ScopeState;
use sitesmith_groups::GroupSpec;
use sitesmith_jobs::{JobSpec, MethodRef, Schedule};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Manifest {
    /// Scope used by entries that do not name one.
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub create_mode: CreateMode,
    #[serde(default)]
    pub scopes: Vec<ScopeEntry>,
    #[serde(default)]
    pub groups: Vec<GroupEntry>,
    #[serde(default)]
    pub jobs: Vec<JobEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScopeEntry {
    pub name: String,
    pub author: String,
    #[serde(default)]
    pub sites: Vec<String>,
    #[serde(default = "default_true")]
    pub default_roles: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct GroupEntry {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub role_type: RoleType,
    #[serde(default)]
    pub owner: Option<String>,
    /// Initial members; the first one becomes the default member.
    #[serde(default)]
    pub members: Vec<String>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub create_mode: Option<CreateMode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobEntry {
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: String,
    pub url: String,
    pub schedule: String,
    /// `"<declaring_type>::<method_name>"`
    pub method: String,
    #[serde(default)]
    pub scope: Option<String>,
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading manifest {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("parsing manifest {}", path.display()))
    }

    pub fn parse(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Picks the entry's own scope, falling back to the manifest default.
    pub fn scope_for<'a>(&'a self, entry_scope: Option<&'a str>, entry: &str) -> Result<&'a str> {
        entry_scope
            .or(self.scope.as_deref())
            .ok_or_else(|| anyhow!("'{entry}' has no scope and the manifest sets no default"))
    }
}

impl ScopeEntry {
    pub fn to_state(&self) -> ScopeState {
        let state = ScopeState::new(&self.author);
        let state = if self.default_roles {
            state.with_default_roles()
        } else {
            state
        };
        self.sites
            .iter()
            .fold(state, |state, site| state.with_site(site))
    }
}

impl GroupEntry {
    pub fn to_spec(&self) -> Result<GroupSpec> {
        let mut builder = GroupSpec::builder(&self.name)
            .description(&self.description)
            .role_type(self.role_type)
            .members(self.members.iter());
        if let Some(owner) = &self.owner {
            builder = builder.owner(owner);
        }
        Ok(builder.build()?)
    }
}

impl JobEntry {
    pub fn to_spec(&self) -> Result<JobSpec> {
        let (declaring_type, method_name) = self.method.rsplit_once("::").ok_or_else(|| {
            anyhow!(
                "job '{}': method '{}' must look like <type>::<method>",
                self.name,
                self.method
            )
        })?;

        let mut builder = JobSpec::builder(&self.name, &self.url)
            .description(&self.description)
            .schedule(Schedule::cron(&self.schedule)?)
            .method(MethodRef::new(declaring_type, method_name));
        if let Some(title) = &self.title {
            builder = builder.title(title);
        }
        Ok(builder.build()?)
    }
}
