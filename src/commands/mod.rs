//! CLI command implementations.
//!
//! Commands orchestrate the library components to perform user tasks.

pub mod compare;

// Re-export main command functions
pub use compare::{
    execute_compare, execute_summarize, validate_args, CompareArgs, SummarizeArgs, TraceSpec,
};
