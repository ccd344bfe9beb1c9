//! Cron schedules for recurring jobs.

use std::fmt;

use chrono::{DateTime, Utc};
use croner::Cron;
use serde::{Deserialize, Serialize};
use sitesmith_core::{ReconcileError, Result};

/// A cron expression the scheduler host understands.
///
/// Validated on construction, stored as text so it survives persistence in a
/// [`JobDescriptor`](sitesmith_core::JobDescriptor).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Schedule {
    expression: String,
}

impl Schedule {
    /// Parses and validates a cron expression.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDescriptor` if the expression does not parse.
    pub fn cron(expression: impl Into<String>) -> Result<Self> {
        let expression = expression.into();
        parse_cron(&expression)?;
        Ok(Self { expression })
    }

    /// Runs once a day at `hour:minute` UTC.
    pub fn daily(hour: u32, minute: u32) -> Result<Self> {
        Self::cron(format!("{minute} {hour} * * *"))
    }

    /// Runs once an hour at `minute`.
    pub fn hourly(minute: u32) -> Result<Self> {
        Self::cron(format!("{minute} * * * *"))
    }

    pub fn as_str(&self) -> &str {
        &self.expression
    }

    /// Next occurrence strictly after `after`.
    pub fn next_after(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let cron = parse_cron(&self.expression).ok()?;
        cron.find_next_occurrence(&after, false).ok()
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expression)
    }
}

impl TryFrom<String> for Schedule {
    type Error = ReconcileError;

    fn try_from(value: String) -> Result<Self> {
        Self::cron(value)
    }
}

impl From<Schedule> for String {
    fn from(schedule: Schedule) -> Self {
        schedule.expression
    }
}

/// Parses a cron expression, mapping failures to `InvalidDescriptor`.
pub fn parse_cron(expression: &str) -> Result<Cron> {
    Cron::new(expression).parse().map_err(|e| {
        ReconcileError::invalid_descriptor(format!("invalid cron expression '{expression}': {e}"))
    })
}
