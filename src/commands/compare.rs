//! Compare command implementation.
//!
//! The compare command:
//! 1. Loads both capture files
//! 2. Builds and links each trace graph
//! 3. Estimates kernel bandwidth and sums category breakdowns
//! 4. Optionally rolls kernel time up the caller chains (blocking mode)
//! 5. Summarizes, collects variations, and assembles the report
//! 6. Prints the comparison table and writes output files

use crate::aggregator::{
    collect_variations, kernel_breakdown, rollup_kernel_time, short_name, summarize,
};
use crate::bandwidth::annotate_bandwidth;
use crate::graph::{build_graph, link_correlations};
use crate::output::{
    build_comparison, build_trace_report, render_comparison, render_summary, write_report,
    write_summary_csv, TraceReport,
};
use crate::parser::{iteration_window, load_trace, IterationWindow};
use anyhow::{Context, Result};
use log::{debug, info};
use std::path::PathBuf;
use std::time::Instant;

/// One side of a comparison: a labelled capture file
///
/// **Public** - constructed from CLI args by main.rs
#[derive(Debug, Clone)]
pub struct TraceSpec {
    /// Label used in tables and the report
    pub label: String,

    /// Iteration to scope to; None analyzes the whole capture
    pub iteration: Option<u32>,

    /// Capture file path
    pub path: PathBuf,
}

/// Arguments for the compare command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct CompareArgs {
    /// First (baseline) trace
    pub first: TraceSpec,

    /// Second (target) trace
    pub second: TraceSpec,

    /// Roll device-kernel time into caller durations (blocking behavior)
    pub blocking: bool,

    /// Output path for the JSON report
    pub output: PathBuf,

    /// Optional output path for the comparison CSV
    pub csv: Option<PathBuf>,

    /// Console table row cap
    pub top: usize,
}

/// Execute the compare command
///
/// **Public** - main entry point called from main.rs
///
/// The two traces are built and analyzed independently; they share no
/// state, only the final comparison step sees both.
pub fn execute_compare(args: CompareArgs) -> Result<()> {
    let start_time = Instant::now();

    info!(
        "Comparing '{}' ({}) against '{}' ({})",
        args.first.label,
        args.first.path.display(),
        args.second.label,
        args.second.path.display()
    );

    let first = analyze_trace(&args.first, args.blocking)
        .with_context(|| format!("Failed to analyze trace '{}'", args.first.label))?;
    let second = analyze_trace(&args.second, args.blocking)
        .with_context(|| format!("Failed to analyze trace '{}'", args.second.label))?;

    let report = build_comparison(first, second);

    println!("{}", render_comparison(&report, args.top));

    write_report(&report, &args.output).context("Failed to write JSON report")?;
    info!("Report written to: {}", args.output.display());

    if let Some(csv_path) = &args.csv {
        write_summary_csv(&report, csv_path).context("Failed to write summary CSV")?;
        info!("Summary CSV written to: {}", csv_path.display());
    }

    info!(
        "Comparison completed in {:.2}s",
        start_time.elapsed().as_secs_f64()
    );
    Ok(())
}

/// Arguments for the summarize command
///
/// **Public** - single-trace variant of compare
#[derive(Debug, Clone)]
pub struct SummarizeArgs {
    pub trace: TraceSpec,
    pub blocking: bool,
    pub top: usize,
}

/// Execute the summarize command
///
/// **Public** - main entry point called from main.rs
pub fn execute_summarize(args: SummarizeArgs) -> Result<()> {
    let report = analyze_trace(&args.trace, args.blocking)
        .with_context(|| format!("Failed to analyze trace '{}'", args.trace.label))?;

    println!("{}", render_summary(&args.trace.label, &report, args.top));
    println!(
        "Kernel time: {} elementwise, {} math, {} other; CPU op time: {}",
        report.breakdown.elementwise,
        report.breakdown.math,
        report.breakdown.other_kernel,
        report.breakdown.cpu_op
    );

    Ok(())
}

/// Run the full analysis pipeline for one trace
///
/// **Private** - phase order matters: breakdown and bandwidth consume raw
/// durations and the linked parent chain; rollup rewrites CPU durations, so
/// summary and variations after it describe end-to-end latency.
fn analyze_trace(spec: &TraceSpec, blocking: bool) -> Result<TraceReport> {
    info!("Analyzing '{}' ...", spec.label);

    let events = load_trace(&spec.path)
        .with_context(|| format!("Failed to load capture {}", spec.path.display()))?;
    debug!("'{}': {} events", spec.label, events.len());

    let window = match spec.iteration {
        Some(iteration) => iteration_window(&events, iteration, 1),
        None => IterationWindow::default(),
    };

    let mut built = build_graph(&events, &window);
    let link_stats = link_correlations(&mut built);
    let estimate_stats = annotate_bandwidth(&mut built.graph);
    let breakdown = kernel_breakdown(&built.graph);

    if blocking {
        // Roll all kernel times back up their caller chains
        rollup_kernel_time(&mut built.graph);
    }

    let ops = summarize(&built.graph);
    let keys = built.graph.names(true, Some(short_name));
    let variations = collect_variations(&built.graph, &keys);

    Ok(build_trace_report(
        &spec.label,
        &built.graph,
        &ops,
        breakdown,
        &variations,
        link_stats,
        estimate_stats,
        built.skipped_events,
    ))
}

/// Validate compare arguments before execution
///
/// **Public** - can be called before execute_compare for early validation
pub fn validate_args(args: &CompareArgs) -> Result<()> {
    validate_spec(&args.first)?;
    validate_spec(&args.second)?;

    if args.top == 0 {
        anyhow::bail!("top must be greater than 0");
    }

    Ok(())
}

fn validate_spec(spec: &TraceSpec) -> Result<()> {
    if spec.label.is_empty() {
        anyhow::bail!("Trace label cannot be empty");
    }
    if !spec.path.exists() {
        anyhow::bail!("Capture file not found: {}", spec.path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(label: &str, path: &str) -> TraceSpec {
        TraceSpec {
            label: label.to_string(),
            iteration: None,
            path: PathBuf::from(path),
        }
    }

    #[test]
    fn test_validate_args_missing_file() {
        let args = CompareArgs {
            first: spec("a", "/nonexistent/a.json"),
            second: spec("b", "/nonexistent/b.json"),
            blocking: true,
            output: PathBuf::from("report.json"),
            csv: None,
            top: 30,
        };

        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_validate_args_empty_label() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let args = CompareArgs {
            first: spec("", file.path().to_str().unwrap()),
            second: spec("b", file.path().to_str().unwrap()),
            blocking: true,
            output: PathBuf::from("report.json"),
            csv: None,
            top: 30,
        };

        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_validate_args_zero_top() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let args = CompareArgs {
            first: spec("a", file.path().to_str().unwrap()),
            second: spec("b", file.path().to_str().unwrap()),
            blocking: true,
            output: PathBuf::from("report.json"),
            csv: None,
            top: 0,
        };

        assert!(validate_args(&args).is_err());
    }
}
