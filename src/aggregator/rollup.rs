//! Kernel-time rollup into caller span durations.
//!
//! Without rollup, summary statistics describe CPU dispatch overhead only.
//! Rolling device-kernel time back up the caller chain makes CPU spans
//! represent "wall time including the device work they triggered", which is
//! what a blocking execution would have measured.

use crate::graph::{NodeId, TraceGraph};
use log::debug;

/// Fold descendant device-kernel time into every ancestor's duration
///
/// **Public** - opt-in, invoked only for blocking mode
///
/// A kernel leaf contributes its own duration and is left untouched. A
/// non-kernel node's contribution is the sum of its children's, recorded as
/// the node's `kernel_duration` and added into its `duration`.
///
/// Not idempotent: a second pass double-counts. Run once per graph.
pub fn rollup_kernel_time(graph: &mut TraceGraph) {
    let total = rollup_node(graph, TraceGraph::ROOT);
    debug!("Rolled up {} units of device-kernel time", total);
}

fn rollup_node(graph: &mut TraceGraph, id: NodeId) -> i64 {
    if graph.node(id).is_kernel {
        return graph.node(id).duration;
    }

    let children = graph.node(id).children.clone();
    let mut kernel_time = 0i64;
    for child in children {
        kernel_time += rollup_node(graph, child);
    }

    let node = graph.node_mut(id);
    node.kernel_duration = kernel_time;
    node.duration += kernel_time;
    kernel_time
}
