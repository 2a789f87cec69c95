//! Trace Compare CLI
//!
//! Rebuilds the call/kernel tree from profiler trace captures and compares
//! two runs operation by operation.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use trace_compare::commands::{
    execute_compare, execute_summarize, validate_args, CompareArgs, SummarizeArgs, TraceSpec,
};
use trace_compare::utils::config::SCHEMA_VERSION;

/// Trace Compare - comparison tool for profiler trace captures
#[derive(Parser, Debug)]
#[command(name = "trace-compare")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Compare two trace captures
    Compare {
        /// First trace: label, iteration number (or "-" for the whole
        /// capture), capture file
        #[arg(short, long, num_args = 3, value_names = ["LABEL", "ITERATION", "FILE"])]
        first: Vec<String>,

        /// Second trace: label, iteration number (or "-"), capture file
        #[arg(short, long, num_args = 3, value_names = ["LABEL", "ITERATION", "FILE"])]
        second: Vec<String>,

        /// Disable blocking behavior (leave CPU durations as raw dispatch
        /// overhead instead of folding kernel time in)
        #[arg(long)]
        no_blocking: bool,

        /// Output path for the JSON report
        #[arg(short, long, default_value = "report.json")]
        output: PathBuf,

        /// Optional output path for a comparison CSV
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Number of rows in the console table
        #[arg(long, default_value = "40")]
        top: usize,
    },

    /// Summarize a single trace capture
    Summarize {
        /// Trace: label, iteration number (or "-"), capture file
        #[arg(short, long, num_args = 3, value_names = ["LABEL", "ITERATION", "FILE"])]
        trace: Vec<String>,

        /// Disable blocking behavior
        #[arg(long)]
        no_blocking: bool,

        /// Number of rows in the console table
        #[arg(long, default_value = "40")]
        top: usize,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    match cli.command {
        Commands::Compare {
            first,
            second,
            no_blocking,
            output,
            csv,
            top,
        } => {
            let args = CompareArgs {
                first: parse_spec(&first)?,
                second: parse_spec(&second)?,
                blocking: !no_blocking,
                output,
                csv,
                top,
            };

            validate_args(&args)?;
            execute_compare(args)?;
        }

        Commands::Summarize {
            trace,
            no_blocking,
            top,
        } => {
            let args = SummarizeArgs {
                trace: parse_spec(&trace)?,
                blocking: !no_blocking,
                top,
            };

            execute_summarize(args)?;
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}

/// Parse the three-part trace argument into a TraceSpec
///
/// **Private** - internal CLI plumbing
fn parse_spec(parts: &[String]) -> Result<TraceSpec> {
    let [label, iteration, file] = parts else {
        anyhow::bail!("Trace argument needs exactly: LABEL ITERATION FILE");
    };

    let iteration = match iteration.as_str() {
        "-" | "None" | "none" => None,
        s => Some(s.parse::<u32>().map_err(|_| {
            anyhow::anyhow!("Iteration must be a number or '-', got '{}'", s)
        })?),
    };

    Ok(TraceSpec {
        label: label.clone(),
        iteration,
        path: PathBuf::from(file),
    })
}

/// Display version information
///
/// **Private** - internal command implementation
fn display_version() {
    println!("Trace Compare v{}", env!("CARGO_PKG_VERSION"));
    println!("Report Schema: v{}", SCHEMA_VERSION);
    println!();
    println!("A comparison tool for profiler trace captures.");
}
