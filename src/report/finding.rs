//! # Finding Definition
//!
//! The core data structure for one reported unsafe insertion.

use colored::*;
use serde::{Deserialize, Serialize};

use crate::parser::Position;

/// One unsafe raw HTML insertion, anchored at its expression's location.
///
/// Created once per occurrence, never mutated. The order of findings in a
/// report is first-discovered-in-tree-order, which matches source order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// File the insertion was found in (label only, never opened here).
    pub filename: String,

    /// Start of the inserted expression.
    pub start: Position,

    /// End of the inserted expression (exclusive column).
    pub end: Position,

    /// Human-readable description of the problem.
    pub message: String,
}

impl Finding {
    /// Prints the finding to the terminal with color formatting.
    pub fn print_terminal(&self, index: usize) {
        println!();
        println!(
            "{} {} {}",
            format!("#{}", index).cyan().bold(),
            "UNSAFE HTML".white().on_red().bold(),
            self.message.white().bold()
        );
        println!(
            "   {} {}:{}:{}",
            "Location:".dimmed(),
            self.filename.blue(),
            self.start.line.to_string().cyan(),
            self.start.column.to_string().cyan()
        );
        println!("{}", "-".repeat(60).dimmed());
    }
}
