//! Trace nodes and the containment-ordered trace graph.
//!
//! Nodes live in an arena owned by the graph and are addressed by `NodeId`;
//! children are owned id lists, parents are non-owning back-references.
//! Placement uses time-interval containment, not log order: asynchronous
//! completion order in the capture does not match nesting order, so a
//! broader span can arrive after its children and must absorb them.

use crate::utils::config::{
    KERNEL_CATEGORIES, LAUNCH_CALL_NAMES, ROOT_NODE_NAME,
};
use crate::utils::error::GraphError;
use serde_json::Value;

/// Stable handle into the graph's node arena
///
/// **Public** - all traversal and aggregation APIs speak NodeId
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Arena index of this node
    pub fn index(self) -> usize {
        self.0
    }
}

/// One reconstructed span: an operation, kernel, or the synthetic root
#[derive(Debug, Clone)]
pub struct TraceNode {
    /// Raw event name
    pub name: String,

    /// Event category (empty when the capture omitted it)
    pub category: String,

    /// Span start timestamp
    pub start: i64,

    /// Span end timestamp (`start + duration`)
    pub end: i64,

    /// Span duration. Mutable: kernel-time rollup rewrites it for
    /// non-kernel nodes.
    pub duration: i64,

    /// Device-kernel time folded in by rollup (zero until rollup runs)
    pub kernel_duration: i64,

    /// Category marks this as a device-kernel execution record
    pub is_kernel: bool,

    /// Name marks this as an async launch call wrapper
    pub is_launch_call: bool,

    /// Owned children in discovery order. Not necessarily time order
    /// after absorption or correlation linking.
    pub children: Vec<NodeId>,

    /// Non-owning back-reference; only the root has none
    pub parent: Option<NodeId>,

    /// Original event attributes. Mutated in place when bandwidth results
    /// or parsed shapes are attached.
    pub args: serde_json::Map<String, Value>,
}

impl TraceNode {
    /// Create a span node from its raw fields
    pub fn new(
        name: String,
        category: String,
        start: i64,
        duration: i64,
        args: serde_json::Map<String, Value>,
    ) -> Self {
        let is_kernel = KERNEL_CATEGORIES.contains(&category.as_str());
        let is_launch_call = LAUNCH_CALL_NAMES.contains(&name.as_str());
        Self {
            name,
            category,
            start,
            end: start + duration,
            duration,
            kernel_duration: 0,
            is_kernel,
            is_launch_call,
            children: Vec::new(),
            parent: None,
            args,
        }
    }

    /// Closed/closed interval containment for node placement.
    ///
    /// Durations are reported as exact closed spans, so a child ending
    /// exactly where its parent ends still nests.
    pub fn contains_span(&self, other: &TraceNode) -> bool {
        other.start >= self.start && other.end <= self.end
    }

    /// Half-open containment for point-in-time queries.
    ///
    /// The open end resolves boundary overlap unambiguously: a timestamp at
    /// a child's start belongs to the child, not the span that just ended.
    pub fn contains_time(&self, ts: i64) -> bool {
        ts >= self.start && ts < self.end
    }

    fn root() -> Self {
        let mut node = TraceNode::new(
            ROOT_NODE_NAME.to_string(),
            String::new(),
            0,
            0,
            serde_json::Map::new(),
        );
        node.end = i64::MAX;
        node
    }
}

/// Containment-ordered tree over all spans of one capture.
///
/// Owns a synthetic root spanning all time; every real node is allocated in
/// the arena and, when inserted, becomes a descendant of the root.
#[derive(Debug)]
pub struct TraceGraph {
    nodes: Vec<TraceNode>,
}

impl TraceGraph {
    /// Handle of the synthetic root
    pub const ROOT: NodeId = NodeId(0);

    pub fn new() -> Self {
        Self {
            nodes: vec![TraceNode::root()],
        }
    }

    /// Number of nodes in the arena, root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Allocate a node in the arena without attaching it to the tree.
    ///
    /// Kernel nodes stay unattached until correlation linking places them.
    pub fn alloc(&mut self, node: TraceNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    pub fn node(&self, id: NodeId) -> &TraceNode {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut TraceNode {
        &mut self.nodes[id.0]
    }

    /// Insert an allocated node into the tree by containment descent.
    ///
    /// Descends from the root into whichever existing child span contains
    /// the node; where none does, the node attaches there. Existing children
    /// of the attach point whose spans the new node contains are re-parented
    /// under it (absorption) - a broader span arriving late consumes the
    /// children already placed.
    pub fn insert(&mut self, id: NodeId) {
        // Descend to the most specific span containing the new node
        let mut cur = Self::ROOT;
        'descend: loop {
            let children = &self.nodes[cur.0].children;
            for i in 0..children.len() {
                let child = self.nodes[cur.0].children[i];
                if self.nodes[child.0].contains_span(&self.nodes[id.0]) {
                    cur = child;
                    continue 'descend;
                }
            }
            break;
        }

        // Absorption: collect first, then remove. Never mutate the child
        // list while iterating it.
        let absorbed: Vec<NodeId> = self.nodes[cur.0]
            .children
            .iter()
            .copied()
            .filter(|&child| self.nodes[id.0].contains_span(&self.nodes[child.0]))
            .collect();
        if !absorbed.is_empty() {
            self.nodes[cur.0]
                .children
                .retain(|child| !absorbed.contains(child));
            for &child in &absorbed {
                self.nodes[child.0].parent = Some(id);
            }
            self.nodes[id.0].children.extend(absorbed);
        }

        self.nodes[id.0].parent = Some(cur);
        self.nodes[cur.0].children.push(id);
    }

    /// Attach `child` directly under `parent`, bypassing containment.
    ///
    /// Escape hatch for correlation linking: a kernel's absolute interval
    /// need not nest inside its launcher's reported interval, because
    /// dispatch latency is real and the two time bases do not align.
    /// Callers must not assume strict nesting for these edges.
    pub fn attach(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Most specific node whose span contains `ts` (half-open semantics)
    ///
    /// # Errors
    /// * `GraphError::TimeOutOfRange` - `ts` lies outside every interval;
    ///   this indicates a log inconsistency or a window-selection bug and
    ///   is surfaced rather than swallowed.
    pub fn find_at(&self, ts: i64) -> Result<NodeId, GraphError> {
        if !self.nodes[Self::ROOT.0].contains_time(ts) {
            return Err(GraphError::TimeOutOfRange(ts));
        }
        let mut cur = Self::ROOT;
        'descend: loop {
            for i in 0..self.nodes[cur.0].children.len() {
                let child = self.nodes[cur.0].children[i];
                if self.nodes[child.0].contains_time(ts) {
                    cur = child;
                    continue 'descend;
                }
            }
            return Ok(cur);
        }
    }

    /// Preorder traversal from the root, root included
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        self.collect_preorder(Self::ROOT, &mut out);
        out
    }

    fn collect_preorder(&self, id: NodeId, out: &mut Vec<NodeId>) {
        out.push(id);
        for &child in &self.nodes[id.0].children {
            self.collect_preorder(child, out);
        }
    }

    /// Distinct names in preorder discovery, optionally skipping kernels,
    /// with an optional normalizer applied first
    pub fn names(&self, skip_kernels: bool, normalize: Option<fn(&str) -> String>) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        let mut out = Vec::new();
        for id in self.preorder() {
            if id == Self::ROOT {
                continue;
            }
            let node = self.node(id);
            if skip_kernels && node.is_kernel {
                continue;
            }
            let name = match normalize {
                Some(f) => f(&node.name),
                None => node.name.clone(),
            };
            if seen.insert(name.clone()) {
                out.push(name);
            }
        }
        out
    }
}

impl Default for TraceGraph {
    fn default() -> Self {
        Self::new()
    }
}
