//! Structural variation grouping.
//!
//! Two spans with the same name can take structurally different paths: the
//! same operation dispatching different kernel sequences across runs or
//! configurations. Grouping by name plus immediate-child signature catches
//! that, where a name-only summary would not.

use super::summary::short_name;
use crate::graph::{NodeId, TraceGraph};
use std::collections::BTreeMap;

/// Resolved description of one child of a variation's representative
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildDescription {
    pub name: String,
    pub duration: i64,
}

/// One structural variation of an operation: a distinct child signature
#[derive(Debug, Clone)]
pub struct Variation {
    /// First node observed with this fingerprint
    pub representative: NodeId,

    /// How many spans share the fingerprint
    pub count: u64,

    /// Summed duration across those spans
    pub total_duration: i64,

    /// Resolved (name, duration) of each of the representative's children,
    /// launch-call wrappers substituted by the kernel they launched
    pub children: Vec<ChildDescription>,
}

/// Group all spans of each short name by structural fingerprint
///
/// **Public** - variation analysis entry point
///
/// The fingerprint is the short name concatenated with the
/// alphanumeric-filtered short name of each immediate child in child order.
/// A child that is an async launch call with exactly one child is replaced
/// by that grandchild: the wrapper is fixed-overhead indirection with no
/// diagnostic value, the grandchild is the real kernel.
pub fn collect_variations(
    graph: &TraceGraph,
    keys: &[String],
) -> BTreeMap<String, Vec<Variation>> {
    let all_nodes = graph.preorder();
    let mut out: BTreeMap<String, Vec<Variation>> = BTreeMap::new();

    for key in keys {
        let mut variations: BTreeMap<String, Variation> = BTreeMap::new();
        for &id in &all_nodes {
            if id == TraceGraph::ROOT || short_name(&graph.node(id).name) != *key {
                continue;
            }

            let fingerprint = fingerprint(graph, key, id);
            let node = graph.node(id);
            let entry = variations.entry(fingerprint).or_insert_with(|| Variation {
                representative: id,
                count: 0,
                total_duration: 0,
                children: describe_children(graph, id),
            });
            entry.count += 1;
            entry.total_duration += node.duration;
        }
        out.insert(key.clone(), variations.into_values().collect());
    }

    out
}

/// Short name with its immediate-child signature appended
fn fingerprint(graph: &TraceGraph, key: &str, id: NodeId) -> String {
    let mut hash = key.to_string();
    for &child in &graph.node(id).children {
        let resolved = resolve_child(graph, child);
        let s_name = short_name(&graph.node(resolved).name);
        hash.extend(s_name.chars().filter(|c| c.is_alphanumeric()));
    }
    hash
}

/// Substitute a single-child launch-call wrapper by the kernel it launched
fn resolve_child(graph: &TraceGraph, child: NodeId) -> NodeId {
    let node = graph.node(child);
    if node.is_launch_call && node.children.len() == 1 {
        node.children[0]
    } else {
        child
    }
}

fn describe_children(graph: &TraceGraph, id: NodeId) -> Vec<ChildDescription> {
    graph
        .node(id)
        .children
        .iter()
        .map(|&child| {
            let resolved = graph.node(resolve_child(graph, child));
            ChildDescription {
                name: resolved.name.clone(),
                duration: resolved.duration,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::TraceNode;

    fn add_node(graph: &mut TraceGraph, name: &str, cat: &str, start: i64, dur: i64) -> NodeId {
        let node = TraceNode::new(
            name.to_string(),
            cat.to_string(),
            start,
            dur,
            serde_json::Map::new(),
        );
        let id = graph.alloc(node);
        graph.insert(id);
        id
    }

    #[test]
    fn test_same_children_one_variation() {
        let mut graph = TraceGraph::new();
        add_node(&mut graph, "aten::add", "cpu_op", 0, 10);
        add_node(&mut graph, "fill", "cpu_op", 2, 3);
        add_node(&mut graph, "aten::add", "cpu_op", 100, 12);
        add_node(&mut graph, "fill", "cpu_op", 102, 3);

        let vars = collect_variations(&graph, &["aten::add".to_string()]);
        let add_vars = &vars["aten::add"];
        assert_eq!(add_vars.len(), 1);
        assert_eq!(add_vars[0].count, 2);
        assert_eq!(add_vars[0].total_duration, 22);
        assert_eq!(add_vars[0].children[0].name, "fill");
    }

    #[test]
    fn test_divergent_children_split_variations() {
        let mut graph = TraceGraph::new();
        add_node(&mut graph, "aten::add", "cpu_op", 0, 10);
        add_node(&mut graph, "fill", "cpu_op", 2, 3);
        add_node(&mut graph, "aten::add", "cpu_op", 100, 12);
        add_node(&mut graph, "copy_", "cpu_op", 102, 3);

        let vars = collect_variations(&graph, &["aten::add".to_string()]);
        assert_eq!(vars["aten::add"].len(), 2);
    }

    #[test]
    fn test_launch_wrapper_substituted_by_kernel() {
        let mut graph = TraceGraph::new();
        add_node(&mut graph, "aten::add", "cpu_op", 0, 20);
        let launch = add_node(&mut graph, "cudaLaunchKernel", "cpu_op", 5, 2);
        let kernel = graph.alloc(TraceNode::new(
            "add_kernel".to_string(),
            "Kernel".to_string(),
            1_000,
            40,
            serde_json::Map::new(),
        ));
        graph.attach(launch, kernel);

        let vars = collect_variations(&graph, &["aten::add".to_string()]);
        let add_vars = &vars["aten::add"];
        assert_eq!(add_vars.len(), 1);
        // The wrapper disappears; the real kernel shows through
        assert_eq!(add_vars[0].children[0].name, "add_kernel");
        assert_eq!(add_vars[0].children[0].duration, 40);
    }

    #[test]
    fn test_wrapper_and_direct_kernel_share_fingerprint() {
        let mut graph = TraceGraph::new();

        // First occurrence launches through a wrapper
        add_node(&mut graph, "aten::add", "cpu_op", 0, 20);
        let launch = add_node(&mut graph, "hipLaunchKernel", "cpu_op", 5, 2);
        let k1 = graph.alloc(TraceNode::new(
            "add_kernel".to_string(),
            "Kernel".to_string(),
            1_000,
            40,
            serde_json::Map::new(),
        ));
        graph.attach(launch, k1);

        // Second occurrence has the kernel as a direct child
        let second = add_node(&mut graph, "aten::add", "cpu_op", 100, 20);
        let k2 = graph.alloc(TraceNode::new(
            "add_kernel".to_string(),
            "Kernel".to_string(),
            2_000,
            40,
            serde_json::Map::new(),
        ));
        graph.attach(second, k2);

        let vars = collect_variations(&graph, &["aten::add".to_string()]);
        assert_eq!(vars["aten::add"].len(), 1);
        assert_eq!(vars["aten::add"][0].count, 2);
    }

    #[test]
    fn test_fingerprint_filters_non_alphanumeric() {
        let mut graph = TraceGraph::new();
        let a = add_node(&mut graph, "aten::add", "cpu_op", 0, 10);
        add_node(&mut graph, "child::one", "cpu_op", 1, 2);

        let fp = fingerprint(&graph, "aten::add", a);
        assert_eq!(fp, "aten::addchildone");
    }
}
