//! Correlation linking of async launch/kernel pairs.
//!
//! Captures emit two companion markers per asynchronous launch: a start-flow
//! marker at the CPU call site and a finish-flow marker at the moment the
//! kernel begins execution, sharing a correlation id but appearing at
//! arbitrary positions in the log. Linking attaches each kernel under the
//! CPU-side span that launched it.

use super::builder::BuiltTrace;
use crate::parser::event::FlowPhase;
use log::{debug, warn};

/// Outcome counters for one linking pass
///
/// **Public** - reported alongside the analysis output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkStats {
    /// Kernels attached to their launcher
    pub linked: usize,

    /// Groups skipped for having other than exactly two markers
    pub skipped_cardinality: usize,

    /// Finish markers whose timestamp matched no indexed kernel
    pub skipped_missing_kernel: usize,

    /// Start markers whose timestamp resolved to no tree node
    pub skipped_lookup: usize,
}

/// Resolve all correlation groups and attach kernels to their launchers
///
/// **Public** - runs once, after construction and before aggregation
///
/// A group resolves only with exactly one start-flow and one finish-flow
/// marker; under-delivery or duplicate delivery from the capture layer is
/// tolerated, not fatal. A failed kernel or launcher lookup aborts that one
/// correlation attempt, not the run.
///
/// The attachment deliberately bypasses the containment invariant: dispatch
/// latency means the kernel's interval may not nest inside the launcher's.
pub fn link_correlations(built: &mut BuiltTrace) -> LinkStats {
    let mut stats = LinkStats::default();

    for (&id, markers) in &built.flow_groups {
        if markers.len() != 2 {
            stats.skipped_cardinality += 1;
            continue;
        }
        let start = markers.iter().find(|m| m.phase == FlowPhase::Start);
        let finish = markers.iter().find(|m| m.phase == FlowPhase::Finish);
        let (Some(start), Some(finish)) = (start, finish) else {
            // Two markers of the same phase - duplicate delivery
            stats.skipped_cardinality += 1;
            continue;
        };

        // The finish marker's timestamp equals the kernel's start
        let Some(&kernel) = built.kernels_by_start.get(&finish.ts) else {
            warn!(
                "Correlation {}: no kernel starting at {}, skipping",
                id, finish.ts
            );
            stats.skipped_missing_kernel += 1;
            continue;
        };

        // The start marker's timestamp lies inside the launching CPU span
        let launcher = match built.graph.find_at(start.ts) {
            Ok(node) => node,
            Err(e) => {
                warn!("Correlation {}: launcher lookup failed: {}", id, e);
                stats.skipped_lookup += 1;
                continue;
            }
        };

        built.graph.attach(launcher, kernel);
        stats.linked += 1;
    }

    debug!(
        "Linked {} kernels ({} cardinality skips, {} missing kernels, {} failed lookups)",
        stats.linked, stats.skipped_cardinality, stats.skipped_missing_kernel, stats.skipped_lookup
    );

    stats
}
