//! Kernel-category time breakdown.
//!
//! Splits total time into elementwise-kernel, math-kernel (device BLAS),
//! other-kernel, and CPU-op buckets. Runs on pre-rollup durations: rollup
//! rewrites CPU span durations and would double-count the CPU bucket.

use crate::graph::TraceGraph;
use crate::utils::config::{ELEMENTWISE_KERNEL_PATTERN, MATH_KERNEL_PATTERNS};
use serde::{Deserialize, Serialize};

/// Summed time per kernel category, plus CPU-op time
///
/// **Public** - part of the report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KernelBreakdown {
    /// Elementwise device-kernel time
    pub elementwise: i64,

    /// Device BLAS (gemm/gemv) kernel time
    pub math: i64,

    /// Every other device-kernel time
    pub other_kernel: i64,

    /// Non-kernel span time (root excluded)
    pub cpu_op: i64,
}

/// Sum time buckets over every node in the graph
///
/// **Public** - breakdown entry point
pub fn kernel_breakdown(graph: &TraceGraph) -> KernelBreakdown {
    let mut breakdown = KernelBreakdown::default();

    for id in graph.preorder() {
        if id == TraceGraph::ROOT {
            continue;
        }
        let node = graph.node(id);
        if node.is_kernel {
            if node.name.contains(ELEMENTWISE_KERNEL_PATTERN) {
                breakdown.elementwise += node.duration;
            } else if MATH_KERNEL_PATTERNS.iter().any(|p| node.name.contains(p)) {
                breakdown.math += node.duration;
            } else {
                breakdown.other_kernel += node.duration;
            }
        } else {
            breakdown.cpu_op += node.duration;
        }
    }

    breakdown
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::TraceNode;

    fn add_node(graph: &mut TraceGraph, name: &str, cat: &str, start: i64, dur: i64) {
        let node = TraceNode::new(
            name.to_string(),
            cat.to_string(),
            start,
            dur,
            serde_json::Map::new(),
        );
        let id = graph.alloc(node);
        graph.insert(id);
    }

    #[test]
    fn test_buckets() {
        let mut graph = TraceGraph::new();
        add_node(&mut graph, "aten::mm", "cpu_op", 0, 100);
        add_node(
            &mut graph,
            "void at::native::vectorized_elementwise_kernel<4>",
            "Kernel",
            10,
            7,
        );
        add_node(&mut graph, "Cijk_Alik_Bljk_SB_MT64", "KernelExecution", 20, 11);
        add_node(&mut graph, "ampere_sgemm_128x64_tn", "Kernel", 40, 13);
        add_node(&mut graph, "memset_kernel", "FillBuffer", 60, 3);

        let breakdown = kernel_breakdown(&graph);
        assert_eq!(breakdown.elementwise, 7);
        assert_eq!(breakdown.math, 24);
        assert_eq!(breakdown.other_kernel, 3);
        assert_eq!(breakdown.cpu_op, 100);
    }

    #[test]
    fn test_empty_graph() {
        let graph = TraceGraph::new();
        assert_eq!(kernel_breakdown(&graph), KernelBreakdown::default());
    }
}
