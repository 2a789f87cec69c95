//! Spreadsheet-importable per-op comparison table.

use super::report::ComparisonReport;
use crate::utils::error::OutputError;
use log::info;
use std::path::Path;

/// Write the shared-op comparison as a flat CSV
///
/// **Public** - one row per shared op, both sides plus deltas
pub fn write_summary_csv(
    report: &ComparisonReport,
    output_path: impl AsRef<Path>,
) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();
    info!("Writing summary CSV to: {}", output_path.display());

    let mut writer = csv::Writer::from_path(output_path).map_err(OutputError::CsvFailed)?;

    writer.write_record([
        "operation".to_string(),
        format!("{}_total", report.first.name),
        "max".to_string(),
        "min".to_string(),
        "median".to_string(),
        "count".to_string(),
        format!("{}_total", report.second.name),
        "max".to_string(),
        "min".to_string(),
        "median".to_string(),
        "count".to_string(),
        "diff_total".to_string(),
        "diff_median".to_string(),
        "ratio".to_string(),
    ])?;

    for delta in &report.deltas {
        let a = &report.first.ops[&delta.op];
        let b = &report.second.ops[&delta.op];
        writer.write_record([
            delta.op.clone(),
            a.total.to_string(),
            a.max.to_string(),
            a.min.to_string(),
            format!("{:.1}", a.median),
            a.count.to_string(),
            b.total.to_string(),
            b.max.to_string(),
            b.min.to_string(),
            format!("{:.1}", b.median),
            b.count.to_string(),
            delta.total_diff.to_string(),
            format!("{:.1}", delta.median_diff),
            format!("{:.3}", delta.ratio),
        ])?;
    }

    writer.flush().map_err(OutputError::WriteFailed)?;
    Ok(())
}
