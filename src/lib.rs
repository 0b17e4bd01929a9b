//! # svelte-sentinel Library
//!
//! A static analysis library for detecting unsafe raw HTML insertions in
//! Svelte components. `{@html ...}` bypasses the compiler's automatic
//! escaping; this crate flags every such insertion that lacks evidence of
//! sanitization, with its exact source location.
//!
//! ## Modules
//!
//! - [`cli`] - Command-line interface definitions and argument parsing
//! - [`parser`] - Template parsing into an immutable tree
//! - [`detectors`] - The `unsafe_html` lint rule
//! - [`report`] - Per-file and whole-scan report types
//!
//! ## Example
//!
//! ```rust,ignore
//! use svelte_sentinel::analyze;
//!
//! let report = analyze(source, "App.svelte", &["sanitize".to_string()], false);
//! for warning in &report.warnings {
//!     println!("{}:{}: {}", warning.filename, warning.start.line, warning.message);
//! }
//! ```

pub mod cli;
pub mod detectors;
pub mod parser;
pub mod report;

pub use cli::Cli;
pub use report::{AnalysisReport, Finding, Report};

/// Analyzes one component and returns its report.
///
/// Parses `source` and runs the `unsafe_html` rule over the resulting
/// tree. `filename` is used only to label findings. `ignore_functions` is
/// the sanitizer allow-list; `runes` selects the parser's modern dialect
/// and is passed through to the parser verbatim.
///
/// A parse failure short-circuits: the detector is never invoked and the
/// report carries the parser's error with an empty warning list. This
/// function holds no state across calls and never panics on any input
/// text.
pub fn analyze(source: &str, filename: &str, ignore_functions: &[String], runes: bool) -> AnalysisReport {
    match parser::parse_template(source, runes) {
        Ok(root) => {
            let warnings = detectors::detect(&root, filename, ignore_functions);
            AnalysisReport::success(filename, warnings)
        }
        Err(error) => AnalysisReport::failure(filename, error),
    }
}
