//! Scoped wall-clock timing of pipeline phases.
//!
//! A [`TimeRecorder`] is a guard: it starts the clock when created and adds
//! the elapsed time to the named entry of a shared [`Timings`] when dropped,
//! so early returns and errors inside the scope are still accounted for.

use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Instant;

/// What a timing entry is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfilingScope {
    Page,
    Document,
}

/// Accumulated measurements for one key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfilingItem {
    pub scope: ProfilingScope,
    pub count: usize,
    /// Individual durations in seconds, in recording order.
    pub times: Vec<f64>,
}

impl ProfilingItem {
    pub fn total(&self) -> f64 {
        self.times.iter().sum()
    }

    pub fn avg(&self) -> f64 {
        if self.times.is_empty() {
            0.0
        } else {
            self.total() / self.times.len() as f64
        }
    }
}

/// Timing entries for one conversion, keyed by phase name.
#[derive(Debug, Default)]
pub struct Timings {
    items: Mutex<BTreeMap<String, ProfilingItem>>,
}

impl Timings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one measurement to `key`.
    pub fn record(&self, key: &str, scope: ProfilingScope, seconds: f64) {
        let mut items = self.items.lock().unwrap_or_else(|e| e.into_inner());
        let item = items.entry(key.to_string()).or_insert_with(|| ProfilingItem {
            scope,
            count: 0,
            times: Vec::new(),
        });
        item.count += 1;
        item.times.push(seconds);
    }

    pub fn get(&self, key: &str) -> Option<ProfilingItem> {
        self.items
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    /// Copy of every entry, ordered by key.
    pub fn snapshot(&self) -> BTreeMap<String, ProfilingItem> {
        self.items.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

/// Records the lifetime of the guard against a [`Timings`] entry.
pub struct TimeRecorder<'a> {
    timings: &'a Timings,
    key: &'static str,
    scope: ProfilingScope,
    start: Instant,
}

impl<'a> TimeRecorder<'a> {
    /// Start timing a page-scoped phase.
    pub fn new(timings: &'a Timings, key: &'static str) -> Self {
        Self::with_scope(timings, key, ProfilingScope::Page)
    }

    pub fn with_scope(timings: &'a Timings, key: &'static str, scope: ProfilingScope) -> Self {
        Self {
            timings,
            key,
            scope,
            start: Instant::now(),
        }
    }
}

impl Drop for TimeRecorder<'_> {
    fn drop(&mut self) {
        self.timings
            .record(self.key, self.scope, self.start.elapsed().as_secs_f64());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorder_adds_one_entry_per_scope() {
        let timings = Timings::new();
        {
            let _t = TimeRecorder::new(&timings, "ocr");
        }
        {
            let _t = TimeRecorder::new(&timings, "ocr");
        }
        let item = timings.get("ocr").expect("recorded");
        assert_eq!(item.count, 2);
        assert_eq!(item.times.len(), 2);
        assert_eq!(item.scope, ProfilingScope::Page);
        assert!(item.total() >= 0.0);
    }

    #[test]
    fn unknown_key_is_absent() {
        assert!(Timings::new().get("ocr").is_none());
    }

    #[test]
    fn avg_of_recorded_values() {
        let timings = Timings::new();
        timings.record("ocr", ProfilingScope::Page, 1.0);
        timings.record("ocr", ProfilingScope::Page, 3.0);
        let item = timings.get("ocr").unwrap();
        assert_eq!(item.avg(), 2.0);
        assert_eq!(item.total(), 4.0);
    }
}
