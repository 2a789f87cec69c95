//! Trace capture loading and event schema.
//!
//! This module handles:
//! - Deserializing the raw `traceEvents` array
//! - Lenient per-event decoding (partial records are skipped, not fatal)
//! - Locating the iteration time window from boundary markers

pub mod event;
pub mod loader;

// Re-export main types
pub use event::{FlowPhase, TraceEvent};
pub use loader::{iteration_window, load_trace, IterationWindow};
