//! Bound-method job entry points.
//!
//! A job descriptor does not carry code. It names a method by declaring type
//! and method name, and the process that executes the job looks the pair up
//! in a [`JobRegistry`](crate::JobRegistry) to find the code to run.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sitesmith_core::SiteHandle;

/// Error type returned by job bodies.
pub type JobMethodError = Box<dyn std::error::Error + Send + Sync>;

/// A `(declaring_type, method_name)` pair identifying a job entry point.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodRef {
    pub declaring_type: String,
    pub method_name: String,
}

impl MethodRef {
    pub fn new(declaring_type: impl Into<String>, method_name: impl Into<String>) -> Self {
        Self {
            declaring_type: declaring_type.into(),
            method_name: method_name.into(),
        }
    }

    /// The binding for a registered [`JobMethod`] type.
    pub fn of<M: JobMethod>() -> Self {
        Self::new(M::DECLARING_TYPE, M::METHOD_NAME)
    }
}

impl fmt::Display for MethodRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.declaring_type, self.method_name)
    }
}

/// Code a recurring job runs.
///
/// Implementors are stateless: a fresh instance is made with
/// [`Default::default`] for every invocation, and the target site is the only
/// input.
///
/// ```ignore
/// #[derive(Default)]
/// struct PurgeRecycleBin;
///
/// #[async_trait]
/// impl JobMethod for PurgeRecycleBin {
///     const DECLARING_TYPE: &'static str = "acme::PurgeRecycleBin";
///     const METHOD_NAME: &'static str = "run";
///
///     async fn run(&self, site: &SiteHandle) -> Result<(), JobMethodError> {
///         // ...
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait JobMethod: Default + Send + Sync + 'static {
    const DECLARING_TYPE: &'static str;
    const METHOD_NAME: &'static str;

    async fn run(&self, site: &SiteHandle) -> Result<(), JobMethodError>;
}
