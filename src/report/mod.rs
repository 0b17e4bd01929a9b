//! # Report Module
//!
//! Packages analysis results for consumption by the CLI and by test
//! harnesses: one [`AnalysisReport`] per analyzed file, and a [`Report`]
//! aggregating a whole scan with metadata and summary counts.

mod finding;

pub use finding::Finding;

use colored::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::parser::ParseError;

/// The result of analyzing one component.
///
/// Exactly one is produced per `analyze` call. The constructors enforce
/// the shape invariant: a failed parse carries an error and no warnings;
/// a successful parse carries no error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// The filename that was analyzed.
    pub filename: String,

    /// Whether the source parsed successfully.
    pub parsed: bool,

    /// The parse error, when `parsed` is false.
    pub error: Option<ParseError>,

    /// Findings for unsafe insertions, in source order.
    pub warnings: Vec<Finding>,
}

impl AnalysisReport {
    /// Report for a file that parsed; `warnings` may be empty.
    pub fn success(filename: impl Into<String>, warnings: Vec<Finding>) -> Self {
        Self {
            filename: filename.into(),
            parsed: true,
            error: None,
            warnings,
        }
    }

    /// Report for a file the parser rejected. Analysis was skipped, so the
    /// warning list is empty by construction.
    pub fn failure(filename: impl Into<String>, error: ParseError) -> Self {
        Self {
            filename: filename.into(),
            parsed: false,
            error: Some(error),
            warnings: Vec::new(),
        }
    }
}

/// A complete scan report over one or more components.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Metadata about the scan operation.
    pub metadata: ReportMetadata,

    /// Per-file analysis results.
    pub reports: Vec<AnalysisReport>,

    /// Summary counts across all files.
    pub summary: ReportSummary,
}

/// Metadata about the scan operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Tool version used for the scan.
    pub version: String,

    /// Unix timestamp when the scan was performed.
    pub timestamp: String,

    /// Path that was scanned.
    pub scanned_path: String,

    /// Number of files analyzed.
    pub files_analyzed: usize,
}

/// Summary counts for a scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Files analyzed in total.
    pub files_analyzed: usize,

    /// Files the parser rejected.
    pub parse_failures: usize,

    /// Unsafe insertions found across all files.
    pub warnings: usize,
}

impl Report {
    /// Builds a scan report, computing summary counts from the per-file
    /// results.
    pub fn new(reports: Vec<AnalysisReport>, scanned_path: &Path) -> Self {
        let summary = ReportSummary::from_reports(&reports);

        let metadata = ReportMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: unix_timestamp(),
            scanned_path: scanned_path.display().to_string(),
            files_analyzed: reports.len(),
        };

        Self {
            metadata,
            reports,
            summary,
        }
    }

    /// True if the scan found anything a CI gate should fail on.
    pub fn has_issues(&self) -> bool {
        self.summary.warnings > 0 || self.summary.parse_failures > 0
    }

    /// Prints colorized per-finding output to the terminal.
    pub fn print_terminal(&self) {
        let mut index = 0;
        for file in &self.reports {
            if let Some(error) = &file.error {
                println!(
                    "\n{} {}: {}",
                    "[x] Parse failure:".red().bold(),
                    file.filename.blue(),
                    error.to_string().dimmed()
                );
                continue;
            }
            for warning in &file.warnings {
                index += 1;
                warning.print_terminal(index);
            }
        }
        if !self.has_issues() {
            println!("\n{}", "[+] No unsafe HTML insertions found.".green().bold());
        }
    }

    /// Prints summary statistics to the terminal.
    pub fn print_summary(&self) {
        println!(
            "{}",
            format!(
                "[*] Summary: {} file(s) analyzed | {} warning(s) | {} parse failure(s)",
                self.summary.files_analyzed, self.summary.warnings, self.summary.parse_failures
            )
            .bold()
        );

        if self.summary.warnings > 0 {
            println!(
                "{}",
                format!("[!] {} unsafe insertion(s) found", self.summary.warnings)
                    .red()
                    .bold()
            );
        } else if self.summary.parse_failures > 0 {
            println!(
                "{}",
                format!("[!] {} file(s) could not be parsed", self.summary.parse_failures)
                    .yellow()
                    .bold()
            );
        } else {
            println!("{}", "[+] No issues found.".green().bold());
        }
    }
}

impl ReportSummary {
    fn from_reports(reports: &[AnalysisReport]) -> Self {
        Self {
            files_analyzed: reports.len(),
            parse_failures: reports.iter().filter(|r| !r.parsed).count(),
            warnings: reports.iter().map(|r| r.warnings.len()).sum(),
        }
    }
}

/// Generates a simple timestamp without external dependencies.
fn unix_timestamp() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};

    let duration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();

    format!("{}", duration.as_secs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Position;
    use std::path::PathBuf;

    fn finding(line: usize) -> Finding {
        Finding {
            filename: "App.svelte".to_string(),
            start: Position { line, column: 7 },
            end: Position { line, column: 16 },
            message: "Unsafe raw HTML insertion without sanitizer".to_string(),
        }
    }

    #[test]
    fn test_failure_report_shape() {
        let report = AnalysisReport::failure(
            "Broken.svelte",
            ParseError {
                message: "unexpected end of input, expected </div>".to_string(),
                line: 2,
                column: 0,
            },
        );
        assert!(!report.parsed);
        assert!(report.error.is_some());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_success_report_shape() {
        let report = AnalysisReport::success("App.svelte", vec![finding(1)]);
        assert!(report.parsed);
        assert!(report.error.is_none());
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_error_serializes_as_null_on_success() {
        let report = AnalysisReport::success("App.svelte", Vec::new());
        let value = serde_json::to_value(&report).unwrap();
        assert!(value["error"].is_null());
        assert_eq!(value["parsed"], true);
    }

    #[test]
    fn test_scan_summary_counts() {
        let reports = vec![
            AnalysisReport::success("A.svelte", vec![finding(1), finding(3)]),
            AnalysisReport::success("B.svelte", Vec::new()),
            AnalysisReport::failure(
                "C.svelte",
                ParseError {
                    message: "expected a tag name".to_string(),
                    line: 1,
                    column: 1,
                },
            ),
        ];
        let report = Report::new(reports, &PathBuf::from("./src"));
        assert_eq!(report.summary.files_analyzed, 3);
        assert_eq!(report.summary.warnings, 2);
        assert_eq!(report.summary.parse_failures, 1);
        assert!(report.has_issues());
    }
}
