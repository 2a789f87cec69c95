//! Trace Compare library
//!
//! Reconstructs hierarchical call/execution trees from flat profiler trace
//! captures and computes comparative statistics over them.

pub mod aggregator;
pub mod bandwidth;
pub mod commands;
pub mod graph;
pub mod output;
pub mod parser;
pub mod utils;
