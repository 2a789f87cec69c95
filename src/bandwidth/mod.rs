//! Device-kernel memory-bandwidth estimation.
//!
//! For elementwise kernels, the bytes a kernel must move are a function of
//! operand shapes and element size alone, so achieved bandwidth falls out
//! of the measured duration. The arithmetic pattern is classified from the
//! kernel name by an ordered list of substring predicates into a closed set
//! of variants, each with its own transfer formula; anything unmatched is
//! an explicit `Unimplemented` fallback that is reported and skipped.

pub mod shape;

pub use shape::{element_count, operand_shapes, OperandShapes};

use crate::graph::{NodeId, TraceGraph};
use crate::utils::config::{BANDWIDTH_KEY, ELEMENTWISE_KERNEL_PATTERN};
use crate::utils::error::EstimateError;
use log::{debug, warn};

/// Arithmetic pattern of an elementwise kernel
///
/// Closed enumeration; each variant carries its own logical-transfer
/// formula. Matched by `classify` via ordered substring predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelPattern {
    /// Binary add: two equal-shape reads plus one write
    BinaryAdd,
    /// Binary multiply: each operand read with its own shape, plus the
    /// broadcast output write
    BinaryMul,
    /// Other binary functor: same 3-transfer default as add
    Binary,
    /// Unary functor: one read, one write (scaling unaries included)
    Unary,
    /// No known pattern; reported and left unannotated
    Unimplemented,
}

// Ordered: unary wrappers first, because a scaling unary embeds the name
// of the binary functor it wraps (AUnaryFunctor<.., MulFunctor<..>>) and
// must not fall into the binary arms. Specific binary functors next,
// family fallbacks last.
const PATTERN_PREDICATES: &[(&str, KernelPattern)] = &[
    ("AUnaryFunctor", KernelPattern::Unary),
    ("UnaryFunctor", KernelPattern::Unary),
    ("CUDAFunctor_add", KernelPattern::BinaryAdd),
    ("AddFunctor", KernelPattern::BinaryAdd),
    ("MulFunctor", KernelPattern::BinaryMul),
    ("BinaryFunctor", KernelPattern::Binary),
];

impl KernelPattern {
    /// Classify a kernel by name substring
    pub fn classify(kernel_name: &str) -> Self {
        for (needle, pattern) in PATTERN_PREDICATES {
            if kernel_name.contains(needle) {
                return *pattern;
            }
        }
        KernelPattern::Unimplemented
    }
}

/// Outcome counters for one estimation pass
///
/// **Public** - reported alongside the analysis output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EstimateStats {
    /// Kernels annotated with a bandwidth figure
    pub annotated: usize,

    /// Kernels skipped for unknown dtype, missing shape, or unsupported
    /// dimensionality
    pub skipped: usize,

    /// Kernels matching no known arithmetic pattern
    pub unimplemented: usize,
}

/// Annotate every recognizable elementwise kernel with achieved GB/s
///
/// **Public** - runs once per graph, after correlation linking and before
/// rollup (kernel durations are untouched by rollup either way, but the
/// launcher walk relies on the linked parent chain)
///
/// Estimator gaps are recoverable: each failure skips one kernel with a
/// diagnostic and the pass continues.
pub fn annotate_bandwidth(graph: &mut TraceGraph) -> EstimateStats {
    let mut stats = EstimateStats::default();

    let kernels: Vec<NodeId> = graph
        .preorder()
        .into_iter()
        .filter(|&id| {
            let node = graph.node(id);
            node.is_kernel && node.name.contains(ELEMENTWISE_KERNEL_PATTERN)
        })
        .collect();

    for kernel in kernels {
        let pattern = KernelPattern::classify(&graph.node(kernel).name);
        if pattern == KernelPattern::Unimplemented {
            warn!(
                "Not implemented for bandwidth estimate: {}",
                graph.node(kernel).name
            );
            stats.unimplemented += 1;
            continue;
        }
        match estimate_kernel(graph, kernel, pattern) {
            Ok(gb_per_sec) => {
                graph.node_mut(kernel).args.insert(
                    BANDWIDTH_KEY.to_string(),
                    serde_json::Value::from(gb_per_sec),
                );
                stats.annotated += 1;
            }
            Err(EstimateError::UnknownDtype(name)) => {
                warn!("Unknown dtype for bandwidth estimate: {}", name);
                stats.skipped += 1;
            }
            Err(e @ EstimateError::UnsupportedShape { .. }) => {
                warn!("{}", e);
                stats.skipped += 1;
            }
            Err(EstimateError::ShapeUnavailable(name)) => {
                warn!("No operand shapes for bandwidth estimate: {}", name);
                stats.skipped += 1;
            }
            Err(EstimateError::NoLauncher(name)) => {
                debug!("Unlinked elementwise kernel, no estimate: {}", name);
                stats.skipped += 1;
            }
        }
    }

    debug!(
        "Bandwidth: {} annotated, {} skipped, {} unimplemented",
        stats.annotated, stats.skipped, stats.unimplemented
    );

    stats
}

/// Estimate one kernel's achieved bandwidth in GB/s
fn estimate_kernel(
    graph: &mut TraceGraph,
    kernel: NodeId,
    pattern: KernelPattern,
) -> Result<f64, EstimateError> {
    let name = graph.node(kernel).name.clone();

    let element_size = element_size_from_name(&name)?;

    // The launching operation sits two levels up: kernel -> launch call
    // wrapper -> operation
    let launcher = graph
        .node(kernel)
        .parent
        .and_then(|launch| graph.node(launch).parent)
        .filter(|&op| op != TraceGraph::ROOT)
        .ok_or_else(|| EstimateError::NoLauncher(name.clone()))?;

    let shapes = operand_shapes(graph, launcher)?;
    if shapes.is_empty() {
        return Err(EstimateError::ShapeUnavailable(name.clone()));
    }

    let transferred_elements = match pattern {
        KernelPattern::BinaryAdd | KernelPattern::Binary => {
            // Operands share a shape; two reads plus one write
            element_count(&shapes[0]) * 3
        }
        KernelPattern::BinaryMul => {
            // Each operand read with its own shape plus the broadcast
            // output; no estimate beyond two dimensions
            for shape in &shapes {
                if shape.len() > 2 {
                    return Err(EstimateError::UnsupportedShape {
                        name: name.clone(),
                        dims: shape.len(),
                    });
                }
            }
            let reads: i64 = shapes.iter().map(|s| element_count(s)).sum();
            let output = shapes
                .iter()
                .map(|s| element_count(s))
                .max()
                .unwrap_or(1);
            reads + output
        }
        KernelPattern::Unary => element_count(&shapes[0]) * 2,
        // Filtered out before estimation
        KernelPattern::Unimplemented => unreachable!("classified before estimate_kernel"),
    };

    let duration = graph.node(kernel).duration;
    Ok(bandwidth_gb_per_sec(
        transferred_elements,
        element_size,
        duration,
    ))
}

/// Element size in bytes from a data-type substring in the kernel name.
/// 16-bit variants are checked first: "BFloat16" would otherwise never
/// match, and "float" alone means 32-bit.
fn element_size_from_name(kernel_name: &str) -> Result<i64, EstimateError> {
    const HALF_DTYPES: &[&str] = &["c10::Half", "c10::BFloat16"];
    if HALF_DTYPES.iter().any(|d| kernel_name.contains(d)) {
        Ok(2)
    } else if kernel_name.contains("float") {
        Ok(4)
    } else {
        Err(EstimateError::UnknownDtype(kernel_name.to_string()))
    }
}

/// bytes / 1e9, divided by the duration in seconds (duration arrives in
/// microseconds)
fn bandwidth_gb_per_sec(elements: i64, element_size: i64, duration_us: i64) -> f64 {
    let gigabytes = (elements * element_size) as f64 / 1e9;
    gigabytes / (duration_us as f64 * 1e-6)
}
