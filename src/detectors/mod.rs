//! # Detection Module
//!
//! Home of the scanner's lint rule. This tool implements exactly one rule,
//! `unsafe_html`, so there is no detector registry: the rule is a pure
//! function over the parsed template tree.
//!
//! | Rule | Name | CWE |
//! |------|------|-----|
//! | unsafe_html | Unsafe Raw HTML Insertion | CWE-79 |

pub mod unsafe_html;

pub use unsafe_html::{detect, RULE_NAME, WARNING_MESSAGE};
