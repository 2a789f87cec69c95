//! Comparison report schema.
//!
//! This module defines the plain-data structure handed to consumers (JSON
//! file, CSV table, console printer). Schema is versioned to allow future
//! evolution.

use crate::aggregator::{KernelBreakdown, OpSummary, Variation};
use crate::bandwidth::EstimateStats;
use crate::graph::{LinkStats, TraceGraph};
use crate::utils::config::{BANDWIDTH_KEY, SCHEMA_VERSION};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Top-level comparison report written to JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonReport {
    /// Schema version for compatibility checking
    pub version: String,

    /// Timestamp when the report was generated
    pub generated_at: String,

    /// First (baseline) trace
    pub first: TraceReport,

    /// Second (target) trace
    pub second: TraceReport,

    /// Short names present in both traces
    pub shared_ops: Vec<String>,

    /// Short names present only in the first trace
    pub first_only: Vec<String>,

    /// Short names present only in the second trace
    pub second_only: Vec<String>,

    /// Per-shared-op deltas, first vs second
    pub deltas: Vec<OpDelta>,
}

/// Analysis results for one trace
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceReport {
    /// User-supplied label for this trace
    pub name: String,

    /// Per-short-name duration statistics
    pub ops: BTreeMap<String, OpStats>,

    /// Kernel-category time breakdown
    pub breakdown: KernelBreakdown,

    /// Structural variations per short name
    pub variations: BTreeMap<String, Vec<VariationRecord>>,

    /// Bandwidth annotations: "kernel-name@start" -> GB/s
    pub bandwidth: BTreeMap<String, f64>,

    /// Correlation linking outcome
    pub link: LinkCounters,

    /// Bandwidth estimation outcome
    pub estimate: EstimateCounters,

    /// Events excluded during construction for missing fields
    pub skipped_events: usize,
}

/// Per-name statistics with the median materialized
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpStats {
    pub total: i64,
    pub max: i64,
    pub min: i64,
    pub median: f64,
    pub count: u64,
}

impl From<&OpSummary> for OpStats {
    fn from(summary: &OpSummary) -> Self {
        Self {
            total: summary.total,
            max: summary.max,
            min: summary.min,
            median: summary.median(),
            count: summary.count,
        }
    }
}

/// One structural variation, resolved to plain data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariationRecord {
    /// Full raw name of the representative span
    pub representative: String,

    /// Occurrences sharing this child signature
    pub count: u64,

    /// Summed duration across occurrences
    pub total_duration: i64,

    /// Resolved children of the representative, in child order
    pub children: Vec<ChildRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChildRecord {
    pub name: String,
    pub duration: i64,
}

/// Delta between the two traces for one shared op
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpDelta {
    pub op: String,

    /// first.total - second.total
    pub total_diff: i64,

    /// first.median - second.median
    pub median_diff: f64,

    /// second.total / first.total
    pub ratio: f64,
}

/// Serializable mirror of `LinkStats`
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct LinkCounters {
    pub linked: usize,
    pub skipped_cardinality: usize,
    pub skipped_missing_kernel: usize,
    pub skipped_lookup: usize,
}

impl From<LinkStats> for LinkCounters {
    fn from(s: LinkStats) -> Self {
        Self {
            linked: s.linked,
            skipped_cardinality: s.skipped_cardinality,
            skipped_missing_kernel: s.skipped_missing_kernel,
            skipped_lookup: s.skipped_lookup,
        }
    }
}

/// Serializable mirror of `EstimateStats`
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct EstimateCounters {
    pub annotated: usize,
    pub skipped: usize,
    pub unimplemented: usize,
}

impl From<EstimateStats> for EstimateCounters {
    fn from(s: EstimateStats) -> Self {
        Self {
            annotated: s.annotated,
            skipped: s.skipped,
            unimplemented: s.unimplemented,
        }
    }
}

/// Build the per-trace report section from analysis results
///
/// **Public** - called once per side by the compare command
pub fn build_trace_report(
    name: &str,
    graph: &TraceGraph,
    ops: &HashMap<String, OpSummary>,
    breakdown: KernelBreakdown,
    variations: &BTreeMap<String, Vec<Variation>>,
    link: LinkStats,
    estimate: EstimateStats,
    skipped_events: usize,
) -> TraceReport {
    let op_stats = ops
        .iter()
        .map(|(name, summary)| (name.clone(), OpStats::from(summary)))
        .collect();

    let variation_records = variations
        .iter()
        .map(|(key, vars)| {
            let records = vars
                .iter()
                .map(|v| VariationRecord {
                    representative: graph.node(v.representative).name.clone(),
                    count: v.count,
                    total_duration: v.total_duration,
                    children: v
                        .children
                        .iter()
                        .map(|c| ChildRecord {
                            name: c.name.clone(),
                            duration: c.duration,
                        })
                        .collect(),
                })
                .collect();
            (key.clone(), records)
        })
        .collect();

    TraceReport {
        name: name.to_string(),
        ops: op_stats,
        breakdown,
        variations: variation_records,
        bandwidth: collect_bandwidth(graph),
        link: link.into(),
        estimate: estimate.into(),
        skipped_events,
    }
}

/// Gather bandwidth annotations into a flat identity -> GB/s table.
/// Kernels without the annotation are simply absent.
fn collect_bandwidth(graph: &TraceGraph) -> BTreeMap<String, f64> {
    let mut out = BTreeMap::new();
    for id in graph.preorder() {
        let node = graph.node(id);
        if let Some(bw) = node.args.get(BANDWIDTH_KEY).and_then(|v| v.as_f64()) {
            out.insert(format!("{}@{}", node.name, node.start), bw);
        }
    }
    out
}

/// Assemble the full comparison report from both sides
///
/// **Public** - final assembly step before output
pub fn build_comparison(first: TraceReport, second: TraceReport) -> ComparisonReport {
    let shared_ops: Vec<String> = first
        .ops
        .keys()
        .filter(|k| second.ops.contains_key(*k))
        .cloned()
        .collect();
    let first_only = first
        .ops
        .keys()
        .filter(|k| !second.ops.contains_key(*k))
        .cloned()
        .collect();
    let second_only = second
        .ops
        .keys()
        .filter(|k| !first.ops.contains_key(*k))
        .cloned()
        .collect();

    let deltas = shared_ops
        .iter()
        .map(|op| {
            let a = &first.ops[op];
            let b = &second.ops[op];
            OpDelta {
                op: op.clone(),
                total_diff: a.total - b.total,
                median_diff: a.median - b.median,
                ratio: if a.total != 0 {
                    b.total as f64 / a.total as f64
                } else {
                    0.0
                },
            }
        })
        .collect();

    ComparisonReport {
        version: SCHEMA_VERSION.to_string(),
        generated_at: Utc::now().to_rfc3339(),
        first,
        second,
        shared_ops,
        first_only,
        second_only,
        deltas,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(total: i64) -> OpStats {
        OpStats {
            total,
            max: total,
            min: total,
            median: total as f64,
            count: 1,
        }
    }

    fn trace_report(name: &str, ops: &[(&str, i64)]) -> TraceReport {
        TraceReport {
            name: name.to_string(),
            ops: ops
                .iter()
                .map(|(op, total)| (op.to_string(), stats(*total)))
                .collect(),
            breakdown: KernelBreakdown::default(),
            variations: BTreeMap::new(),
            bandwidth: BTreeMap::new(),
            link: LinkCounters::default(),
            estimate: EstimateCounters::default(),
            skipped_events: 0,
        }
    }

    #[test]
    fn test_shared_and_exclusive_ops() {
        let first = trace_report("a", &[("aten::add", 100), ("aten::mul", 50)]);
        let second = trace_report("b", &[("aten::add", 200), ("aten::relu", 10)]);

        let report = build_comparison(first, second);
        assert_eq!(report.shared_ops, vec!["aten::add".to_string()]);
        assert_eq!(report.first_only, vec!["aten::mul".to_string()]);
        assert_eq!(report.second_only, vec!["aten::relu".to_string()]);
    }

    #[test]
    fn test_delta_math() {
        let first = trace_report("a", &[("aten::add", 100)]);
        let second = trace_report("b", &[("aten::add", 150)]);

        let report = build_comparison(first, second);
        let delta = &report.deltas[0];
        assert_eq!(delta.total_diff, -50);
        assert_eq!(delta.ratio, 1.5);
    }
}
