//! Shared foundation for the sitesmith reconcilers.
//!
//! - [`platform`] - narrow collaborator traits for the external platform
//! - [`model`] - records exchanged with it
//! - [`types`] - role types and create modes
//! - [`error`] - platform and reconcile error taxonomy
//! - [`guard`] - scoped unsafe-update elevation

pub mod error;
pub mod guard;
pub mod model;
pub mod platform;
pub mod types;

pub use error::{PlatformError, PlatformResult, ReconcileError, Result};
pub use guard::UnsafeUpdateGuard;
pub use model::{
    GroupRecord, JobDescriptor, NewGroup, Principal, Profile, RoleAssignment, RoleDefinition,
    SiteHandle,
};
pub use platform::{
    GroupPlatform, GroupStore, JobPlatform, PrincipalStore, ProfileDirectory, RoleStore,
    SchedulerHost, ScopeStore, SiteDirectory,
};
pub use types::{CreateMode, RoleType};
