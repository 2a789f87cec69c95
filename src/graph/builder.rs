//! One-pass graph construction from the ordered event stream.
//!
//! Events are triaged into three roles:
//! - complete non-kernel spans inside the window: inserted into the tree
//! - complete kernel spans inside the window (plus a grace period past the
//!   end boundary): allocated and indexed by start timestamp, attached
//!   later by the correlation linker
//! - flow markers: grouped by correlation id for the linker

use super::node::{NodeId, TraceGraph, TraceNode};
use crate::parser::event::{FlowPhase, TraceEvent};
use crate::parser::loader::IterationWindow;
use crate::utils::config::HINT_MARKER;
use log::debug;
use std::collections::{BTreeMap, HashMap};

/// One correlation marker, reduced to the fields linking needs
#[derive(Debug, Clone, Copy)]
pub struct FlowMarker {
    pub phase: FlowPhase,
    pub ts: i64,
}

/// Output of graph construction: the tree plus the linker's working sets
#[derive(Debug)]
pub struct BuiltTrace {
    pub graph: TraceGraph,

    /// Device-kernel nodes indexed by start timestamp. Owned by this one
    /// analysis run, never process-wide.
    pub kernels_by_start: HashMap<i64, NodeId>,

    /// Flow markers grouped by correlation id. BTreeMap keeps link
    /// resolution order (and therefore child append order) deterministic.
    pub flow_groups: BTreeMap<u64, Vec<FlowMarker>>,

    /// Events excluded for missing required fields
    pub skipped_events: usize,
}

/// Build the trace graph for one capture
///
/// **Public** - main entry point for construction
///
/// # Arguments
/// * `events` - ordered event sequence from the loader
/// * `window` - iteration time window (default = whole capture)
pub fn build_graph(events: &[TraceEvent], window: &IterationWindow) -> BuiltTrace {
    let mut graph = TraceGraph::new();
    let mut kernels_by_start: HashMap<i64, NodeId> = HashMap::new();
    let mut flow_groups: BTreeMap<u64, Vec<FlowMarker>> = BTreeMap::new();
    let mut skipped_events = 0usize;

    for event in events {
        if event.is_complete_span() {
            let ts = event.ts.unwrap_or_default();
            let node = make_node(event);
            if node.is_kernel {
                // Kernels tolerate the grace window; they are only indexed
                // for linking, never containment-inserted.
                if window.contains_kernel(ts) {
                    let start = node.start;
                    let id = graph.alloc(node);
                    kernels_by_start.insert(start, id);
                }
            } else if window.contains(ts) {
                // Capture-side hint records duplicate real events
                if !is_hint(event) {
                    let id = graph.alloc(node);
                    graph.insert(id);
                }
            }
        } else if event.is_flow_marker() {
            // is_flow_marker guarantees ts; the id still has to be checked
            let (Some(ts), Some(id)) = (event.ts, event.id) else {
                skipped_events += 1;
                continue;
            };
            // A finish marker can trail past the window end when its start
            // marker was already seen; keep the pair intact.
            if ts >= window.start && (ts <= window.end || flow_groups.contains_key(&id)) {
                flow_groups.entry(id).or_default().push(FlowMarker {
                    phase: event.phase(),
                    ts,
                });
            }
        } else {
            skipped_events += 1;
        }
    }

    debug!(
        "Built graph: {} nodes, {} kernels indexed, {} flow groups, {} events skipped",
        graph.len(),
        kernels_by_start.len(),
        flow_groups.len(),
        skipped_events
    );

    BuiltTrace {
        graph,
        kernels_by_start,
        flow_groups,
        skipped_events,
    }
}

fn make_node(event: &TraceEvent) -> TraceNode {
    TraceNode::new(
        event.name.clone().unwrap_or_default(),
        event.cat.clone().unwrap_or_default(),
        event.ts.unwrap_or_default(),
        event.dur.unwrap_or_default(),
        event.args.clone().unwrap_or_default(),
    )
}

/// AMD-side "hint" records carry a UserMarker desc and would count twice
fn is_hint(event: &TraceEvent) -> bool {
    event
        .args
        .as_ref()
        .and_then(|args| args.get("desc"))
        .and_then(|v| v.as_str())
        .map(|desc| desc.contains(HINT_MARKER))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(value: serde_json::Value) -> TraceEvent {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_ops_inserted_kernels_indexed() {
        let events = vec![
            event(json!({"name": "aten::add", "cat": "cpu_op", "ts": 100, "dur": 50, "args": {}})),
            event(json!({"name": "add_kernel", "cat": "Kernel", "ts": 160, "dur": 10, "args": {}})),
        ];

        let built = build_graph(&events, &IterationWindow::default());
        // Root + op + kernel allocated; only the op is attached
        assert_eq!(built.graph.len(), 3);
        assert_eq!(built.graph.node(TraceGraph::ROOT).children.len(), 1);
        assert!(built.kernels_by_start.contains_key(&160));
        let kernel = built.kernels_by_start[&160];
        assert!(built.graph.node(kernel).parent.is_none());
    }

    #[test]
    fn test_window_excludes_ops_but_graces_kernels() {
        let window = IterationWindow { start: 0, end: 1_000 };
        let events = vec![
            event(json!({"name": "late_op", "cat": "cpu_op", "ts": 2_000, "dur": 10, "args": {}})),
            event(json!({"name": "late_kernel", "cat": "Kernel", "ts": 2_000, "dur": 10, "args": {}})),
            event(
                json!({"name": "too_late", "cat": "Kernel", "ts": 1_200_000, "dur": 10, "args": {}}),
            ),
        ];

        let built = build_graph(&events, &window);
        assert_eq!(built.graph.node(TraceGraph::ROOT).children.len(), 0);
        assert!(built.kernels_by_start.contains_key(&2_000));
        assert!(!built.kernels_by_start.contains_key(&1_200_000));
    }

    #[test]
    fn test_hint_records_excluded() {
        let events = vec![event(json!({
            "name": "aten::add", "cat": "cpu_op", "ts": 100, "dur": 50,
            "args": {"desc": "UserMarker frame"}
        }))];

        let built = build_graph(&events, &IterationWindow::default());
        assert_eq!(built.graph.node(TraceGraph::ROOT).children.len(), 0);
    }

    #[test]
    fn test_flow_markers_grouped_by_id() {
        let events = vec![
            event(json!({"name": "l", "cat": "async", "ts": 100, "ph": "s", "id": 9})),
            event(json!({"name": "l", "cat": "async", "ts": 140, "ph": "f", "id": 9})),
        ];

        let built = build_graph(&events, &IterationWindow::default());
        assert_eq!(built.flow_groups[&9].len(), 2);
    }

    #[test]
    fn test_trailing_finish_marker_kept_when_pair_started() {
        let window = IterationWindow { start: 0, end: 1_000 };
        let events = vec![
            event(json!({"name": "l", "cat": "async", "ts": 900, "ph": "s", "id": 4})),
            // Past the window end, but the id is already open
            event(json!({"name": "l", "cat": "async", "ts": 1_500, "ph": "f", "id": 4})),
            // Fresh id past the window end is dropped
            event(json!({"name": "l", "cat": "async", "ts": 1_500, "ph": "s", "id": 5})),
        ];

        let built = build_graph(&events, &window);
        assert_eq!(built.flow_groups[&4].len(), 2);
        assert!(!built.flow_groups.contains_key(&5));
    }

    #[test]
    fn test_span_without_args_key_skipped() {
        let events = vec![
            event(json!({"name": "aten::add", "cat": "cpu_op", "ts": 100, "dur": 50, "args": {}})),
            // Same fields minus the args key: an auxiliary row, not a span
            event(json!({"name": "aten::add", "cat": "cpu_op", "ts": 110, "dur": 5})),
        ];

        let built = build_graph(&events, &IterationWindow::default());
        assert_eq!(built.graph.node(TraceGraph::ROOT).children.len(), 1);
        assert_eq!(built.skipped_events, 1);
    }

    #[test]
    fn test_partial_records_skipped() {
        let events = vec![
            event(json!({"name": "metadata only"})),
            event(json!({"ts": 100, "dur": 5})),
        ];

        let built = build_graph(&events, &IterationWindow::default());
        assert_eq!(built.skipped_events, 2);
        assert!(built.graph.is_empty());
    }
}
