//! Trace graph construction: containment tree, event triage, and
//! correlation linking.
//!
//! This module turns the flat, timestamp-ordered event log into a properly
//! nested interval tree and attaches asynchronously executed kernels to the
//! CPU spans that launched them.

pub mod builder;
pub mod linker;
pub mod node;

// Re-export main types
pub use builder::{build_graph, BuiltTrace, FlowMarker};
pub use linker::{link_correlations, LinkStats};
pub use node::{NodeId, TraceGraph, TraceNode};
