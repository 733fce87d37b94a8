//! In-memory stat sink
//!
//! Keeps a bounded window of timing samples per stat name and plain
//! counters, and summarises them on request.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::trace;

use super::StatSink;

/// Performance profiler for dispatch timings
pub struct DispatchProfiler {
    /// Timing samples by stat name, oldest first
    samples: Mutex<HashMap<String, VecDeque<Duration>>>,
    /// Counters by name, and by (name, key)
    counters: Mutex<Counters>,
    /// Maximum samples to keep per stat
    max_samples: usize,
}

#[derive(Default)]
struct Counters {
    totals: HashMap<String, u64>,
    by_key: HashMap<(String, String), u64>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // Samples stay usable after a panicking holder; the data is append-only
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl DispatchProfiler {
    /// Create a new profiler; `max_samples` is clamped to at least one
    pub fn new(max_samples: usize) -> Self {
        Self {
            samples: Mutex::new(HashMap::new()),
            counters: Mutex::new(Counters::default()),
            max_samples: max_samples.max(1),
        }
    }

    /// Summary statistics for a stat name
    pub fn stats(&self, name: &str) -> OperationStats {
        let samples = lock(&self.samples);
        match samples.get(name) {
            Some(times) => calculate_stats(times.iter().copied().collect()),
            None => OperationStats::default(),
        }
    }

    /// Names of every stat with at least one sample
    pub fn stat_names(&self) -> Vec<String> {
        let mut names: Vec<String> = lock(&self.samples).keys().cloned().collect();
        names.sort();
        names
    }

    /// Total for a counter across all keys
    pub fn counter(&self, name: &str) -> u64 {
        lock(&self.counters).totals.get(name).copied().unwrap_or(0)
    }

    /// Keys recorded for a counter, sorted
    pub fn counter_keys(&self, name: &str) -> Vec<String> {
        let mut keys: Vec<String> = lock(&self.counters)
            .by_key
            .keys()
            .filter(|(counter, _)| counter == name)
            .map(|(_, key)| key.clone())
            .collect();
        keys.sort();
        keys
    }

    /// Count for a counter and one key
    pub fn counter_for(&self, name: &str, key: &str) -> u64 {
        lock(&self.counters)
            .by_key
            .get(&(name.to_string(), key.to_string()))
            .copied()
            .unwrap_or(0)
    }
}

impl Default for DispatchProfiler {
    fn default() -> Self {
        Self::new(1000) // Keep last 1000 samples
    }
}

impl StatSink for DispatchProfiler {
    fn record(&self, name: &str, key: &str, elapsed: Duration) {
        trace!(stat = name, key, elapsed_us = elapsed.as_micros() as u64, "stat recorded");
        let mut samples = lock(&self.samples);
        let times = samples.entry(name.to_string()).or_default();
        times.push_back(elapsed);
        while times.len() > self.max_samples {
            times.pop_front();
        }
    }

    fn increment(&self, counter: &str, key: &str) {
        let mut counters = lock(&self.counters);
        *counters.totals.entry(counter.to_string()).or_insert(0) += 1;
        *counters
            .by_key
            .entry((counter.to_string(), key.to_string()))
            .or_insert(0) += 1;
    }
}

fn calculate_stats(mut sorted: Vec<Duration>) -> OperationStats {
    if sorted.is_empty() {
        return OperationStats::default();
    }

    let count = sorted.len();
    let total: Duration = sorted.iter().sum();
    let avg = total / count as u32;
    sorted.sort();

    let ms = |d: Duration| d.as_secs_f64() * 1000.0;
    OperationStats {
        count,
        avg_ms: ms(avg),
        p50_ms: ms(sorted[count / 2]),
        p95_ms: ms(sorted[(count * 95) / 100]),
        p99_ms: ms(sorted[(count * 99) / 100]),
        min_ms: ms(sorted[0]),
        max_ms: ms(sorted[count - 1]),
    }
}

/// Statistics for a single stat name
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct OperationStats {
    /// Number of samples
    pub count: usize,
    /// Average time (milliseconds)
    pub avg_ms: f64,
    /// 50th percentile (median) time (milliseconds)
    pub p50_ms: f64,
    /// 95th percentile time (milliseconds)
    pub p95_ms: f64,
    /// 99th percentile time (milliseconds)
    pub p99_ms: f64,
    /// Minimum time (milliseconds)
    pub min_ms: f64,
    /// Maximum time (milliseconds)
    pub max_ms: f64,
}
