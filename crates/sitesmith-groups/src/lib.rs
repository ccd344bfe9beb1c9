//! Access group reconciliation.
//!
//! A [`GroupSpec`] describes the desired group; [`GroupReconciler`] converges
//! a scope to it under a [`CreateMode`](sitesmith_core::CreateMode) and answers
//! membership queries.

pub mod group;
pub mod login;
pub mod reconciler;
pub mod settings;

pub use group::{GroupSpec, GroupSpecBuilder};
pub use login::corp_id;
pub use reconciler::{GroupOutcome, GroupReconciler};
pub use settings::{GroupSettings, RoleAssignmentPolicy};
