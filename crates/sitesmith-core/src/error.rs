//! Error types shared by the group and job reconcilers.
//!
//! Two layers are distinguished:
//!
//! - [`PlatformError`] - a collaborator (directory, role store, scheduler host)
//!   failed to answer.
//! - [`ReconcileError`] - the reconciliation itself cannot proceed, either
//!   because the platform failed or because the desired state cannot be
//!   applied in the given scope.

use thiserror::Error;

/// Errors raised by external platform collaborators.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// The backing store rejected or failed an operation.
    #[error("Storage error: {message}")]
    Storage {
        /// Description of the storage failure.
        message: String,
    },

    /// The scope is not known to the platform.
    #[error("Scope not found: {scope}")]
    ScopeNotFound {
        /// Name of the missing scope.
        scope: String,
    },

    /// A fail point armed on a test platform fired.
    #[error("Injected failure in {operation}")]
    Injected {
        /// Operation the failure was injected into.
        operation: String,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PlatformError {
    /// Creates a new `Storage` error.
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Creates a new `ScopeNotFound` error.
    #[must_use]
    pub fn scope_not_found(scope: impl Into<String>) -> Self {
        Self::ScopeNotFound {
            scope: scope.into(),
        }
    }

    /// Creates a new `Injected` error.
    #[must_use]
    pub fn injected(operation: impl Into<String>) -> Self {
        Self::Injected {
            operation: operation.into(),
        }
    }
}

/// Result alias for collaborator calls.
pub type PlatformResult<T> = std::result::Result<T, PlatformError>;

/// Errors that abort a reconciliation or job execution.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The job's target site does not resolve in the scope.
    ///
    /// Raised both when registering a job and when the host executes it.
    /// This is a configuration error and is never retried.
    #[error("Site ({url}) cannot be found in scope ({scope})")]
    TargetNotFound {
        /// The url that failed to resolve.
        url: String,
        /// Scope the lookup ran in.
        scope: String,
    },

    /// The operation requires an existing resource and the lookup found none.
    #[error("{kind} '{name}' not found in scope ({scope})")]
    ResourceNotFound {
        /// Resource kind, e.g. "group".
        kind: &'static str,
        /// Identity that was looked up.
        name: String,
        /// Scope the lookup ran in.
        scope: String,
    },

    /// No role definition of the requested type exists in the scope.
    #[error("No role definition of type {role_type} in scope ({scope})")]
    RoleDefinitionNotFound {
        /// Requested role type.
        role_type: String,
        /// Scope the lookup ran in.
        scope: String,
    },

    /// The desired-state description is unusable.
    #[error("Invalid descriptor: {message}")]
    InvalidDescriptor {
        /// What is wrong with it.
        message: String,
    },

    /// A descriptor references a method nobody registered.
    #[error("No handler registered for {declaring_type}::{method_name}")]
    HandlerNotRegistered {
        /// Declaring type of the bound method.
        declaring_type: String,
        /// Method name of the bound method.
        method_name: String,
    },

    /// A registered job handler returned an error.
    #[error("Job {name} failed: {message}")]
    JobFailed {
        /// Scheduling identity of the job.
        name: String,
        /// Handler error message.
        message: String,
    },

    #[error(transparent)]
    Platform(#[from] PlatformError),
}

impl ReconcileError {
    /// Creates a new `TargetNotFound` error.
    #[must_use]
    pub fn target_not_found(url: impl Into<String>, scope: impl Into<String>) -> Self {
        Self::TargetNotFound {
            url: url.into(),
            scope: scope.into(),
        }
    }

    /// Creates a new `ResourceNotFound` error.
    #[must_use]
    pub fn resource_not_found(
        kind: &'static str,
        name: impl Into<String>,
        scope: impl Into<String>,
    ) -> Self {
        Self::ResourceNotFound {
            kind,
            name: name.into(),
            scope: scope.into(),
        }
    }

    /// Creates a new `RoleDefinitionNotFound` error.
    #[must_use]
    pub fn role_definition_not_found(
        role_type: impl Into<String>,
        scope: impl Into<String>,
    ) -> Self {
        Self::RoleDefinitionNotFound {
            role_type: role_type.into(),
            scope: scope.into(),
        }
    }

    /// Creates a new `InvalidDescriptor` error.
    #[must_use]
    pub fn invalid_descriptor(message: impl Into<String>) -> Self {
        Self::InvalidDescriptor {
            message: message.into(),
        }
    }

    /// Creates a new `HandlerNotRegistered` error.
    #[must_use]
    pub fn handler_not_registered(
        declaring_type: impl Into<String>,
        method_name: impl Into<String>,
    ) -> Self {
        Self::HandlerNotRegistered {
            declaring_type: declaring_type.into(),
            method_name: method_name.into(),
        }
    }

    /// Creates a new `JobFailed` error.
    #[must_use]
    pub fn job_failed(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::JobFailed {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Returns `true` for the "no matching resource" sentinel.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ResourceNotFound { .. })
    }
}

/// Result alias for reconciler operations.
pub type Result<T> = std::result::Result<T, ReconcileError>;
