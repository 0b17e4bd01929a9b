//! # Template Parser Module
//!
//! Turns Svelte component source text into an immutable template tree for
//! analysis. The detector consumes the tree through the node types in
//! [`ast`]; everything else here is parsing machinery.
//!
//! ## Key Types
//!
//! - [`Node`] - Tagged sum type over template node kinds
//! - [`Expression`] - Shallow classification of a mustache expression
//! - [`ParseError`] - Structured parse failure with source position

mod ast;
mod template_parser;

pub use ast::*;
pub use template_parser::parse_template;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A parse failure with the position the parser gave up at.
///
/// Lines are 1-based and columns 0-based, matching [`Position`].
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message} at {line}:{column}")]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl ParseError {
    pub(crate) fn new(message: impl Into<String>, pos: Position) -> Self {
        Self {
            message: message.into(),
            line: pos.line,
            column: pos.column,
        }
    }
}
