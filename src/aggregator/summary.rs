//! Per-name statistical summary of all spans in a graph.

use crate::graph::{TraceGraph, TraceNode};
use std::collections::HashMap;

/// Accumulated duration statistics for one normalized operation name
///
/// **Public** - handed to the report layer as plain data
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OpSummary {
    /// Sum of all durations
    pub total: i64,

    /// Longest single duration
    pub max: i64,

    /// Shortest single duration
    pub min: i64,

    /// Every individual duration, in traversal order; median is computed
    /// lazily from this list
    pub durations: Vec<i64>,

    /// Number of spans with this name
    pub count: u64,
}

impl OpSummary {
    fn record(&mut self, duration: i64) {
        if self.count == 0 {
            self.min = duration;
            self.max = duration;
        } else {
            self.max = self.max.max(duration);
            self.min = self.min.min(duration);
        }
        self.total += duration;
        self.count += 1;
        self.durations.push(duration);
    }

    /// Median of the recorded durations
    pub fn median(&self) -> f64 {
        median(&self.durations)
    }
}

/// Normalize a raw event name to its short form.
///
/// First whitespace-delimited token with commas stripped; templated C++
/// kernel names start with "void", where the return type alone says
/// nothing, so those keep the untruncated raw name.
pub fn short_name(raw: &str) -> String {
    let token = raw
        .split_whitespace()
        .next()
        .unwrap_or(raw)
        .replace(',', "");
    if token == "void" {
        raw.to_string()
    } else {
        token
    }
}

/// Group every span (root excluded) by short name and accumulate statistics
///
/// **Public** - main summary entry point
///
/// Totals, max, min and counts are independent of traversal order; only the
/// duration list order varies, and median sorts it anyway.
pub fn summarize(graph: &TraceGraph) -> HashMap<String, OpSummary> {
    let mut ops: HashMap<String, OpSummary> = HashMap::new();
    for id in graph.preorder() {
        if id == TraceGraph::ROOT {
            continue;
        }
        let node: &TraceNode = graph.node(id);
        ops.entry(short_name(&node.name))
            .or_default()
            .record(node.duration);
    }
    ops
}

/// Median as the average of the two central elements of the ascending sort.
/// For odd counts the two central elements are the same one.
pub fn median(durations: &[i64]) -> f64 {
    if durations.is_empty() {
        return 0.0;
    }
    let mut sorted = durations.to_vec();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;
    let lo = sorted[sorted.len() - 1 - mid];
    let hi = sorted[mid];
    (lo + hi) as f64 / 2.0
}
