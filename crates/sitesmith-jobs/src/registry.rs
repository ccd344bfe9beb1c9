//! Lookup table from method bindings to executable job bodies.

use std::sync::Arc;

use dashmap::DashMap;
use futures_util::future::BoxFuture;
use sitesmith_core::SiteHandle;
use tracing::{debug, warn};

use crate::method::{JobMethod, JobMethodError, MethodRef};

/// Type-erased job body.
pub type JobInvoker =
    Arc<dyn Fn(SiteHandle) -> BoxFuture<'static, Result<(), JobMethodError>> + Send + Sync>;

/// Registry of job methods keyed by [`MethodRef`].
///
/// Populated at startup by whatever process executes jobs. Registering the
/// same binding twice replaces the earlier entry.
#[derive(Default)]
pub struct JobRegistry {
    methods: DashMap<MethodRef, JobInvoker>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `M` under its declared binding.
    pub fn register<M: JobMethod>(&self) -> MethodRef {
        let binding = MethodRef::of::<M>();
        let invoker: JobInvoker = Arc::new(
            |site: SiteHandle| -> BoxFuture<'static, Result<(), JobMethodError>> {
                Box::pin(async move {
                    let method = M::default();
                    method.run(&site).await
                })
            },
        );

        if self.methods.insert(binding.clone(), invoker).is_some() {
            warn!(method = %binding, "Job method re-registered, replacing previous entry");
        } else {
            debug!(method = %binding, "Job method registered");
        }
        binding
    }

    pub fn get(&self, binding: &MethodRef) -> Option<JobInvoker> {
        self.methods.get(binding).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, binding: &MethodRef) -> bool {
        self.methods.contains_key(binding)
    }

    /// Registered bindings, sorted for stable output.
    pub fn bindings(&self) -> Vec<MethodRef> {
        let mut bindings: Vec<_> = self.methods.iter().map(|e| e.key().clone()).collect();
        bindings.sort_by(|a, b| {
            (&a.declaring_type, &a.method_name).cmp(&(&b.declaring_type, &b.method_name))
        });
        bindings
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}
