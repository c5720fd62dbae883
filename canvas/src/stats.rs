//! Sliding-window run statistics.
//!
//! Each time update from the engine carries the run timestamp plus a bag of
//! numeric metrics. Every metric keeps its last [`MAX_HISTORY`] samples and
//! the maximum over exactly those samples. The maximum is recomputed from
//! the window on each push so an evicted maximum never lingers.

#[cfg(test)]
#[path = "stats_test.rs"]
mod stats_test;

use std::collections::{HashMap, VecDeque};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::consts::{MAX_HISTORY, TIME_KEY};

/// Display labels for the metrics the engine is known to report.
const METRIC_LABELS: &[(&str, &str)] = &[
    ("numRules", "Current Rules"),
    ("numNewRules", "New Rules"),
    ("numRulesDiscarded", "Discarded Rules"),
    ("numRulesFired", "Newly Fired Rules"),
    ("numGoals", "Unresolved Goals"),
    ("resolvedGoals", "Resolved Goals"),
    ("failedGoals", "Failed Goals"),
];

/// Human label for a metric key; unknown keys label as themselves.
#[must_use]
pub fn metric_label(key: &str) -> &str {
    METRIC_LABELS
        .iter()
        .find(|(k, _)| *k == key)
        .map_or(key, |(_, label)| *label)
}

/// Bounded trailing history of one metric.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    samples: VecDeque<f64>,
    max: f64,
}

impl Series {
    /// Append a sample, evicting the oldest beyond capacity, and recompute
    /// the window maximum.
    pub fn push(&mut self, value: f64) {
        self.samples.push_back(value);
        while self.samples.len() > MAX_HISTORY {
            self.samples.pop_front();
        }
        self.max = self.samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    }

    /// Samples, oldest first.
    pub fn samples(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Maximum over the current window.
    #[must_use]
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Most recent sample.
    #[must_use]
    pub fn latest(&self) -> Option<f64> {
        self.samples.back().copied()
    }
}

/// One metric as the statistics panel shows it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSummary {
    pub key: String,
    pub label: String,
    /// Window samples, oldest first.
    pub samples: Vec<f64>,
    pub max: f64,
}

/// Per-metric series plus the latest run timestamp.
#[derive(Debug, Clone, Default)]
pub struct Statistics {
    series: HashMap<String, Series>,
    time: Option<Value>,
}

impl Statistics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Push one sample for `metric`, stamped with the run time.
    pub fn record(&mut self, metric: &str, value: f64, time: &Value) {
        self.time = Some(time.clone());
        self.series.entry(metric.to_owned()).or_default().push(value);
    }

    /// Ingest a full time update. The time key is tracked, not windowed;
    /// non-numeric metrics are skipped.
    pub fn apply_update(&mut self, update: &Map<String, Value>) {
        let time = update.get(TIME_KEY).cloned().unwrap_or(Value::Null);
        self.time = Some(time.clone());
        for (key, value) in update {
            if key == TIME_KEY {
                continue;
            }
            if let Some(n) = value.as_f64() {
                self.record(key, n, &time);
            }
        }
    }

    #[must_use]
    pub fn series(&self, metric: &str) -> Option<&Series> {
        self.series.get(metric)
    }

    /// Window maximum for `metric`.
    #[must_use]
    pub fn max(&self, metric: &str) -> Option<f64> {
        self.series.get(metric).map(Series::max)
    }

    /// Metric keys, sorted.
    #[must_use]
    pub fn metrics(&self) -> Vec<&str> {
        let mut keys = self.series.keys().map(String::as_str).collect::<Vec<_>>();
        keys.sort_unstable();
        keys
    }

    /// Every metric with its label, window and maximum, sorted by key.
    #[must_use]
    pub fn summary(&self) -> Vec<MetricSummary> {
        self.metrics()
            .into_iter()
            .filter_map(|key| {
                let series = self.series.get(key)?;
                Some(MetricSummary {
                    key: key.to_owned(),
                    label: metric_label(key).to_owned(),
                    samples: series.samples().collect(),
                    max: series.max(),
                })
            })
            .collect()
    }

    /// Latest run timestamp, if any update has arrived.
    #[must_use]
    pub fn time(&self) -> Option<&Value> {
        self.time.as_ref()
    }

    /// Forget every series; called when a run starts.
    pub fn reset(&mut self) {
        self.series.clear();
        self.time = None;
    }
}
