//! Traversal-based aggregations over a built trace graph.
//!
//! This module transforms one analyzed graph into:
//! - Kernel-time rollup (blocking-mode durations)
//! - Per-name statistical summaries
//! - Structural variation groupings
//! - Kernel-category time breakdown

pub mod breakdown;
pub mod rollup;
pub mod summary;
pub mod variation;

// Re-export main types and functions
pub use breakdown::{kernel_breakdown, KernelBreakdown};
pub use rollup::rollup_kernel_time;
pub use summary::{median, short_name, summarize, OpSummary};
pub use variation::{collect_variations, ChildDescription, Variation};
