//! Report assembly and output writers.
//!
//! The analysis core hands its results over as plain data; this module
//! assembles the versioned report structure and writes it as JSON, CSV,
//! or a console table.

pub mod csv;
pub mod json;
pub mod report;
pub mod table;

// Re-export main types and functions
pub use self::csv::write_summary_csv;
pub use json::{read_report, write_report};
pub use report::{
    build_comparison, build_trace_report, ComparisonReport, OpDelta, OpStats, TraceReport,
    VariationRecord,
};
pub use table::{render_comparison, render_summary};
