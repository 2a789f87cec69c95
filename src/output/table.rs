//! Fixed-width console comparison table.
//!
//! Report ordering is a presentation concern: rows are sorted by the first
//! trace's total, descending, so the expensive ops lead.

use super::report::ComparisonReport;

/// Render the shared-op comparison as a fixed-width text table
///
/// **Public** - returns the rendered table; the caller prints it
pub fn render_comparison(report: &ComparisonReport, top: usize) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "{:<48} {:>8} {:>7} {:>7} {:>8} {:>6}  {:>8} {:>7} {:>7} {:>8} {:>6} {:>7}\n",
        "Operation",
        truncate(&report.first.name, 8),
        "max",
        "min",
        "median",
        "count",
        truncate(&report.second.name, 8),
        "max",
        "min",
        "median",
        "count",
        "ratio",
    ));

    let mut rows: Vec<&str> = report.shared_ops.iter().map(|s| s.as_str()).collect();
    rows.sort_by_key(|op| std::cmp::Reverse(report.first.ops[*op].total));

    for op in rows.into_iter().take(top) {
        let a = &report.first.ops[op];
        let b = &report.second.ops[op];
        let ratio = if a.total != 0 {
            b.total as f64 / a.total as f64
        } else {
            0.0
        };
        out.push_str(&format!(
            "{:<48} {:>8} {:>7} {:>7} {:>8.1} {:>6}  {:>8} {:>7} {:>7} {:>8.1} {:>6} {:>7.3}\n",
            truncate(op, 45),
            a.total,
            a.max,
            a.min,
            a.median,
            a.count,
            b.total,
            b.max,
            b.min,
            b.median,
            b.count,
            ratio,
        ));
    }

    if !report.first_only.is_empty() {
        out.push_str(&format!(
            "\nOnly in {}: {}\n",
            report.first.name,
            report.first_only.join(", ")
        ));
    }
    if !report.second_only.is_empty() {
        out.push_str(&format!(
            "Only in {}: {}\n",
            report.second.name,
            report.second_only.join(", ")
        ));
    }

    out
}

/// Single-trace summary table used by the summarize command
///
/// **Public**
pub fn render_summary(name: &str, report: &super::report::TraceReport, top: usize) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<48} {:>8} {:>7} {:>7} {:>8} {:>6}\n",
        "Operation",
        truncate(name, 8),
        "max",
        "min",
        "median",
        "count",
    ));

    let mut rows: Vec<&String> = report.ops.keys().collect();
    rows.sort_by_key(|op| std::cmp::Reverse(report.ops[*op].total));

    for op in rows.into_iter().take(top) {
        let s = &report.ops[op];
        out.push_str(&format!(
            "{:<48} {:>8} {:>7} {:>7} {:>8.1} {:>6}\n",
            truncate(op, 45),
            s.total,
            s.max,
            s.min,
            s.median,
            s.count,
        ));
    }

    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        s.chars().take(max).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::KernelBreakdown;
    use crate::output::report::{
        build_comparison, EstimateCounters, LinkCounters, OpStats, TraceReport,
    };
    use std::collections::BTreeMap;

    fn side(name: &str, ops: &[(&str, i64)]) -> TraceReport {
        TraceReport {
            name: name.to_string(),
            ops: ops
                .iter()
                .map(|(op, total)| {
                    (
                        op.to_string(),
                        OpStats {
                            total: *total,
                            max: *total,
                            min: *total,
                            median: *total as f64,
                            count: 1,
                        },
                    )
                })
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
    fn test_rows_sorted_by_first_total() {
        let report = build_comparison(
            side("a", &[("small", 10), ("big", 1000)]),
            side("b", &[("small", 20), ("big", 900)]),
        );

        let table = render_comparison(&report, 10);
        let big_pos = table.find("big").unwrap();
        let small_pos = table.find("small").unwrap();
        assert!(big_pos < small_pos);
    }

    #[test]
    fn test_top_limits_rows() {
        let report = build_comparison(
            side("a", &[("one", 10), ("two", 20), ("three", 30)]),
            side("b", &[("one", 10), ("two", 20), ("three", 30)]),
        );

        let table = render_comparison(&report, 1);
        assert!(table.contains("three"));
        // Header plus exactly one row
        assert_eq!(table.lines().count(), 2);
    }

    #[test]
    fn test_exclusive_ops_listed() {
        let report = build_comparison(side("a", &[("lonely", 10)]), side("b", &[]));
        let table = render_comparison(&report, 10);
        assert!(table.contains("Only in a: lonely"));
    }

    #[test]
    fn test_long_names_truncated() {
        let long = "a".repeat(100);
        let report = build_comparison(side("a", &[(&long, 10)]), side("b", &[(&long, 10)]));
        let table = render_comparison(&report, 10);
        assert!(table.contains(&"a".repeat(45)));
        assert!(!table.contains(&"a".repeat(46)));
    }
}
