//! Snapshot of every stored metric, used by the listing page and RPC name listing

use serde::{Deserialize, Serialize};

use crate::entities::MetricValue;

/// Every stored metric, each namespace sorted by name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricListing {
    /// Counter totals
    pub counters: Vec<(String, i64)>,
    /// Gauge values
    pub gauges: Vec<(String, f64)>,
}

impl MetricListing {
    /// Build a listing, sorting both namespaces by name
    pub fn new(mut counters: Vec<(String, i64)>, mut gauges: Vec<(String, f64)>) -> Self {
        counters.sort_by(|a, b| a.0.cmp(&b.0));
        gauges.sort_by(|a, b| a.0.cmp(&b.0));
        Self { counters, gauges }
    }

    /// Total number of stored metrics
    pub fn len(&self) -> usize {
        self.counters.len() + self.gauges.len()
    }

    /// Whether nothing is stored
    pub fn is_empty(&self) -> bool {
        self.counters.is_empty() && self.gauges.is_empty()
    }

    /// `[name]: [value]` lines for counters
    pub fn counter_lines(&self) -> Vec<String> {
        self.counters
            .iter()
            .map(|(name, v)| render_line(name, MetricValue::Counter(*v)))
            .collect()
    }

    /// `[name]: [value]` lines for gauges, three decimals
    pub fn gauge_lines(&self) -> Vec<String> {
        self.gauges
            .iter()
            .map(|(name, v)| render_line(name, MetricValue::Gauge(*v)))
            .collect()
    }

    /// Gauge lines followed by counter lines
    pub fn lines(&self) -> Vec<String> {
        let mut lines = self.gauge_lines();
        lines.extend(self.counter_lines());
        lines
    }
}

fn render_line(name: &str, value: MetricValue) -> String {
    format!("[{name}]: [{value}]")
}
