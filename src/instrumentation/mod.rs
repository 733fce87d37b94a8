//! Dispatch instrumentation
//!
//! The router reports timings and counters to a [`StatSink`]. Reporting is
//! fire-and-forget: a sink never blocks or fails a dispatch.

pub mod profiler;

use std::sync::Arc;
use std::time::{Duration, Instant};

pub use profiler::{DispatchProfiler, OperationStats};

/// Timing stat recorded around every dispatch
pub const DISPATCH_TIME: &str = "DispatchingTime";
/// Counter bumped when the fallback builder produced the response
pub const FALLBACK_COUNTER: &str = "dispatch.fallback";
/// Counter bumped when a module handler failed or panicked
pub const HANDLER_ERROR_COUNTER: &str = "dispatch.handler_error";
/// Counter bumped per module refused by the dependency resolver
pub const EXCLUDED_COUNTER: &str = "resolver.excluded";

/// Receiver of dispatch timings and counters
pub trait StatSink: Send + Sync {
    /// Record one timing sample for `name`; `key` identifies the occurrence
    fn record(&self, name: &str, key: &str, elapsed: Duration);

    /// Bump a counter
    fn increment(&self, counter: &str, key: &str);
}

/// Sink that drops everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl StatSink for NoopSink {
    fn record(&self, _name: &str, _key: &str, _elapsed: Duration) {}

    fn increment(&self, _counter: &str, _key: &str) {}
}

/// Running measurement, recorded on [`StatTimer::finish`] or on drop
pub struct StatTimer {
    sink: Arc<dyn StatSink>,
    name: String,
    key: String,
    started: Instant,
    recorded: bool,
}

impl StatTimer {
    /// Start a named measurement
    pub fn start(sink: Arc<dyn StatSink>, name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            sink,
            name: name.into(),
            key: key.into(),
            started: Instant::now(),
            recorded: false,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Stop the timer and record the duration
    pub fn finish(mut self) -> Duration {
        self.record()
    }

    fn record(&mut self) -> Duration {
        let elapsed = self.started.elapsed();
        if !self.recorded {
            self.recorded = true;
            self.sink.record(&self.name, &self.key, elapsed);
        }
        elapsed
    }
}

impl Drop for StatTimer {
    fn drop(&mut self) {
        self.record();
    }
}
