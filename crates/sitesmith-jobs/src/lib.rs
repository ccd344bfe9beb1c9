//! Recurring job management.
//!
//! - [`JobSpec`] describes a job bound to a site and a [`MethodRef`].
//! - [`JobReconciler`] registers and removes descriptors on the scheduler host.
//! - [`JobRegistry`] maps method bindings to [`JobMethod`] implementations.
//! - [`JobExecutor`] and [`JobScheduler`] run descriptors when they come due.

pub mod copy;
pub mod executor;
pub mod job;
pub mod method;
pub mod reconciler;
pub mod registry;
pub mod schedule;
pub mod scheduler;

pub use copy::{CopyFrom, materialize};
pub use executor::JobExecutor;
pub use job::{JobSpec, JobSpecBuilder};
pub use method::{JobMethod, JobMethodError, MethodRef};
pub use reconciler::JobReconciler;
pub use registry::{JobInvoker, JobRegistry};
pub use schedule::Schedule;
pub use scheduler::{JobScheduler, SchedulerConfig};
