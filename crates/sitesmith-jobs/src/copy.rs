//! Field copying between job specs and registered descriptors.

use sitesmith_core::JobDescriptor;

use crate::job::JobSpec;

/// Overwrites the fields of `self` that have a counterpart in `S`.
///
/// Each implementation lists its field mapping explicitly. Fields of the
/// target with no counterpart keep their values.
pub trait CopyFrom<S: ?Sized> {
    fn copy_from(&mut self, source: &S);
}

/// Copies the descriptive fields of a spec.
///
/// `name` and `title` receive the effective values. The method binding is
/// not touched.
impl CopyFrom<JobSpec> for JobDescriptor {
    fn copy_from(&mut self, source: &JobSpec) {
        self.name = source.effective_name();
        self.title = source.effective_title();
        self.description = source.description().to_string();
        self.url = source.url().to_string();
        self.schedule = source.schedule().as_str().to_string();
    }
}

/// Builds the descriptor registered for `spec`.
pub fn materialize(spec: &JobSpec) -> JobDescriptor {
    let mut descriptor = JobDescriptor::default();
    descriptor.copy_from(spec);
    descriptor.declaring_type = spec.method().declaring_type.clone();
    descriptor.method_name = spec.method().method_name.clone();
    descriptor
}
