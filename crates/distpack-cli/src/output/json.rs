//! JSON output formatter for machine-readable results.

use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use super::formatter::Status;
use anyhow::Result;
use distpack_core::BundleReport;
use serde::Serialize;
use std::io::Write;
use std::io::{self};
use std::path::Path;

pub struct JsonFormatter;

#[derive(Debug, Serialize)]
struct BundleOutput {
    output_path: String,
    files_added: usize,
    files_skipped: usize,
    timestamps_clamped: usize,
    bytes_written: u64,
    bytes_compressed: u64,
    archive_size_mb: f64,
    compression_percentage: f64,
    missing_sources: Vec<String>,
    duration_ms: u128,
    warnings: Vec<String>,
}

impl BundleOutput {
    fn from_report(output_path: &Path, report: &BundleReport) -> Self {
        Self {
            output_path: output_path.display().to_string(),
            files_added: report.files_added,
            files_skipped: report.files_skipped,
            timestamps_clamped: report.timestamps_clamped,
            bytes_written: report.bytes_written,
            bytes_compressed: report.bytes_compressed,
            archive_size_mb: report.archive_size_mb(),
            compression_percentage: report.compression_percentage(),
            missing_sources: report
                .missing_sources
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
            duration_ms: report.duration.as_millis(),
            warnings: report.warnings.clone(),
        }
    }
}

impl JsonFormatter {
    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_bundle_result(
        &self,
        operation: &str,
        output_path: &Path,
        report: &BundleReport,
    ) -> Result<()> {
        let status = if report.has_warnings() || !report.missing_sources.is_empty() {
            Status::Warning
        } else {
            Status::Success
        };
        let output = JsonOutput::new(
            operation,
            status,
            BundleOutput::from_report(output_path, report),
        );
        Self::output(&output)
    }
}
