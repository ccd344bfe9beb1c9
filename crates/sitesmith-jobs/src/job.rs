//! Desired-state description of a recurring job.

use serde::{Deserialize, Serialize};
use sitesmith_core::{ReconcileError, Result};

use crate::method::{JobMethod, MethodRef};
use crate::schedule::Schedule;

/// A recurring job bound to one site.
///
/// The registered name and title are derived from the base name, the
/// optional title and the target URL (see [`effective_name`](Self::effective_name)),
/// so the same spec targeted at two sites yields two distinct jobs.
///
/// Deserialization goes through [`JobSpecBuilder`], so a deserialized spec
/// is normalized and validated like a built one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawJobSpec")]
pub struct JobSpec {
    name: String,
    title: Option<String>,
    description: String,
    url: String,
    schedule: Schedule,
    method: MethodRef,
}

impl JobSpec {
    /// Starts a builder. Spaces in `name` become underscores.
    pub fn builder(name: impl Into<String>, url: impl Into<String>) -> JobSpecBuilder {
        JobSpecBuilder::new(name, url)
    }

    /// Base name with spaces replaced by underscores.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn method(&self) -> &MethodRef {
        &self.method
    }

    /// Name the job is registered under.
    ///
    /// The base name when it already contains the URL, otherwise
    /// `"{name}_{url}"`.
    pub fn effective_name(&self) -> String {
        qualify(&self.name, &self.url, "_")
    }

    /// Display title.
    ///
    /// Falls back to the base name when no title is set. The URL is appended
    /// as `" - {url}"` unless the title already contains it.
    pub fn effective_title(&self) -> String {
        let base = match self.title.as_deref() {
            Some(title) if !title.is_empty() => title,
            _ => &self.name,
        };
        qualify(base, &self.url, " - ")
    }
}

fn qualify(base: &str, url: &str, separator: &str) -> String {
    if base.contains(url) {
        base.to_string()
    } else {
        format!("{base}{separator}{url}")
    }
}

#[derive(Deserialize)]
struct RawJobSpec {
    name: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: String,
    url: String,
    schedule: Schedule,
    method: MethodRef,
}

impl TryFrom<RawJobSpec> for JobSpec {
    type Error = ReconcileError;

    fn try_from(raw: RawJobSpec) -> Result<Self> {
        let mut builder = JobSpecBuilder::new(raw.name, raw.url)
            .description(raw.description)
            .schedule(raw.schedule)
            .method(raw.method);
        if let Some(title) = raw.title {
            builder = builder.title(title);
        }
        builder.build()
    }
}

/// Builder for [`JobSpec`].
#[derive(Debug, Clone)]
pub struct JobSpecBuilder {
    name: String,
    title: Option<String>,
    description: String,
    url: String,
    schedule: Option<Schedule>,
    method: Option<MethodRef>,
}

impl JobSpecBuilder {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into().replace(' ', "_"),
            title: None,
            description: String::new(),
            url: url.into(),
            schedule: None,
            method: None,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn schedule(mut self, schedule: Schedule) -> Self {
        self.schedule = Some(schedule);
        self
    }

    pub fn method(mut self, method: MethodRef) -> Self {
        self.method = Some(method);
        self
    }

    /// Binds the job to a [`JobMethod`] implementation.
    pub fn bind<M: JobMethod>(self) -> Self {
        self.method(MethodRef::of::<M>())
    }

    /// # Errors
    ///
    /// Returns `InvalidDescriptor` when the name or URL is empty, or the
    /// schedule or method binding is missing.
    pub fn build(self) -> Result<JobSpec> {
        if self.name.trim_matches('_').is_empty() {
            return Err(ReconcileError::invalid_descriptor("job name is empty"));
        }
        if self.url.trim().is_empty() {
            return Err(ReconcileError::invalid_descriptor(format!(
                "job '{}' has no target url",
                self.name
            )));
        }
        let schedule = self.schedule.ok_or_else(|| {
            ReconcileError::invalid_descriptor(format!("job '{}' has no schedule", self.name))
        })?;
        let method = self.method.ok_or_else(|| {
            ReconcileError::invalid_descriptor(format!(
                "job '{}' is not bound to a method",
                self.name
            ))
        })?;
        if method.declaring_type.is_empty() || method.method_name.is_empty() {
            return Err(ReconcileError::invalid_descriptor(format!(
                "job '{}' has an incomplete method binding",
                self.name
            )));
        }

        Ok(JobSpec {
            name: self.name,
            title: self.title,
            description: self.description,
            url: self.url,
            schedule,
            method,
        })
    }
}
