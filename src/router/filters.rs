//! Filter/validation error state
//!
//! Handlers record validation failures here; the fallback builder turns
//! the first failure into the response when no module answered.

use serde::{Deserialize, Serialize};

/// A filter that rejected the request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedFilter {
    pub name: String,
    pub message: String,
    pub status: u16,
}

impl FailedFilter {
    pub fn new(name: impl Into<String>, message: impl Into<String>, status: u16) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            status,
        }
    }
}

/// Error state consulted by the fallback builder
pub trait FilterManager: Send {
    fn have_errors(&self) -> bool;

    /// All recorded failures as a JSON document
    fn serialize_errors(&self) -> String;

    /// The failure that determines the fallback response
    fn failed_filter(&self) -> Option<FailedFilter>;

    fn record_failure(&mut self, filter: FailedFilter);

    /// Forget every recorded failure
    fn clear(&mut self);
}

/// Default request-scoped filter state
///
/// The first recorded failure is the one reported.
#[derive(Debug, Default, Clone)]
pub struct FilterLog {
    failures: Vec<FailedFilter>,
}

impl FilterLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failures(&self) -> &[FailedFilter] {
        &self.failures
    }
}

impl FilterManager for FilterLog {
    fn have_errors(&self) -> bool {
        !self.failures.is_empty()
    }

    fn serialize_errors(&self) -> String {
        serde_json::to_string(&self.failures).unwrap_or_else(|_| "[]".to_string())
    }

    fn failed_filter(&self) -> Option<FailedFilter> {
        self.failures.first().cloned()
    }

    fn record_failure(&mut self, filter: FailedFilter) {
        self.failures.push(filter);
    }

    fn clear(&mut self) {
        self.failures.clear();
    }
}
