//! # CLI Module
//!
//! Command-line interface for the scanner, defined with `clap` derive
//! macros.
//!
//! ## Commands
//!
//! - `scan` - Analyze Svelte components for unsafe `{@html}` insertions
//! - `version` - Show version information

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// svelte-sentinel command-line interface.
///
/// A static analysis security scanner for Svelte components. Flags raw
/// HTML insertions that lack a recognized sanitizer call or an adjacent
/// `svelte-ignore unsafe_html` comment.
#[derive(Parser, Debug)]
#[command(name = "svelte-sentinel")]
#[command(version)]
#[command(about = "Static analysis scanner for unsafe {@html} insertions in Svelte components")]
#[command(long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan Svelte components for unsafe raw HTML insertions.
    ///
    /// Analyzes `.svelte` files for `{@html}` tags whose expression is not
    /// wrapped in an allow-listed sanitizer and not covered by an adjacent
    /// suppression comment.
    Scan {
        /// Path to the file or directory to scan.
        ///
        /// If a directory is specified, all `.svelte` files within it are
        /// analyzed.
        #[arg(value_name = "PATH")]
        path: PathBuf,

        /// Scan directories recursively.
        #[arg(short, long, default_value_t = true)]
        recursive: bool,

        /// Output format for the report.
        ///
        /// Supported formats:
        /// - `terminal`: Colorized console output (default)
        /// - `json`: Machine-readable JSON format
        /// - `github`: GitHub Actions annotations
        #[arg(short, long, default_value = "terminal")]
        format: String,

        /// Function names trusted as sanitizers.
        ///
        /// An insertion wrapped in a call to one of these names is not
        /// flagged. Example: --ignore sanitize,purify
        #[arg(short, long, value_delimiter = ',')]
        ignore: Vec<String>,

        /// Parse templates in runes (Svelte 5) mode.
        ///
        /// Enables `{@render}` tags and `{#snippet}` blocks. Has no effect
        /// on detection itself.
        #[arg(long)]
        runes: bool,
    },

    /// Print version information.
    Version,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    /// Verify that the CLI definition is valid.
    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }
}
