//! In-memory platform backend for sitesmith.
//!
//! Implements every collaborator trait from `sitesmith-core` so the
//! reconcilers can run without a real platform. State can be exported and
//! restored as a [`PlatformSnapshot`].
//!
//! # Example
//!
//! ```ignore
//! use sitesmith_db_memory::{InMemoryPlatform, ScopeState};
//!
//! let platform = InMemoryPlatform::new();
//! platform.insert_scope(
//!     "portal",
//!     ScopeState::new("CORP\\spadmin")
//!         .with_default_roles()
//!         .with_site("https://portal/hr"),
//! );
//! ```

pub mod state;
pub mod storage;

pub use state::{PlatformSnapshot, ScopeState};
pub use storage::{FailPoint, InMemoryPlatform};
