//! # Unsafe Raw HTML Insertion Detector
//!
//! Finds `{@html ...}` tags that insert a string directly as markup with no
//! evidence of sanitization.
//!
//! ## Vulnerability Pattern
//!
//! ```svelte,ignore
//! <div>{@html userInput}</div>
//! ```
//!
//! ## Safe Patterns
//!
//! ```svelte,ignore
//! <div>{@html sanitize(userInput)}</div>
//! <!-- svelte-ignore unsafe_html -->
//! <div>{@html trustedMarkup}</div>
//! ```
//!
//! The rule is conservative: an insertion is flagged unless a sanitizer
//! call from the caller's allow-list wraps it, or a `svelte-ignore`
//! comment sits adjacent to it. Sanitizer recognition is by name only —
//! no import resolution, no aliasing, no data flow.
//!
//! ## CWE Reference
//!
//! - CWE-79: Improper Neutralization of Input During Web Page Generation

use crate::parser::{Expression, Node, RawMustacheTag};
use crate::report::Finding;

/// Rule name recognized in `svelte-ignore` suppression comments.
pub const RULE_NAME: &str = "unsafe_html";

/// Message attached to every finding this rule produces.
pub const WARNING_MESSAGE: &str = "Unsafe raw HTML insertion without sanitizer";

/// Walks the tree and returns one finding per unsafe `{@html}` insertion,
/// in depth-first left-to-right (source) order.
///
/// `ignore_functions` is the sanitizer allow-list; an empty list means no
/// call is trusted. The root is usually a fragment, but a bare raw tag is
/// accepted too and classified with no sibling context.
pub fn detect(root: &Node, filename: &str, ignore_functions: &[String]) -> Vec<Finding> {
    let mut warnings = Vec::new();
    check_node(root, filename, ignore_functions, &mut warnings);
    warnings
}

fn check_node(node: &Node, filename: &str, ignore_functions: &[String], warnings: &mut Vec<Finding>) {
    if let Some(children) = node.children() {
        for (i, child) in children.iter().enumerate() {
            if child.children().is_some() {
                check_node(child, filename, ignore_functions, warnings);
            } else if let Node::RawMustache(tag) = child {
                if is_sanitized(tag, ignore_functions) {
                    continue;
                }
                if is_suppressed(children, i) {
                    continue;
                }
                warnings.push(finding_for(tag, filename));
            }
        }
    } else if let Node::RawMustache(tag) = node {
        // Degenerate root: no siblings, so only the sanitizer check applies.
        if !is_sanitized(tag, ignore_functions) {
            warnings.push(finding_for(tag, filename));
        }
    }
}

/// True iff the insertion is a direct call to a name on the allow-list.
///
/// Member access, computed callees, and bare references never qualify.
fn is_sanitized(tag: &RawMustacheTag, ignore_functions: &[String]) -> bool {
    match &tag.expression {
        Expression::Call {
            callee: Some(name), ..
        } => ignore_functions.iter().any(|f| f == name),
        _ => false,
    }
}

/// Checks whether a qualifying suppression comment is adjacent to the
/// insertion at `index` within its sibling sequence.
///
/// Four positions are tried in order, first match wins:
/// 1. immediately following;
/// 2. following across one whitespace-only text node;
/// 3. immediately preceding;
/// 4. preceding across one whitespace-only text node.
///
/// At most one whitespace gap is ever skipped, so a comment on the same
/// line or the line directly above/below suppresses, while anything
/// further away does not.
fn is_suppressed(siblings: &[Node], index: usize) -> bool {
    if let Some(next) = siblings.get(index + 1) {
        if suppressing_comment(next) {
            return true;
        }
        if whitespace_text(next) && siblings.get(index + 2).is_some_and(suppressing_comment) {
            return true;
        }
    }
    if index > 0 {
        let prev = &siblings[index - 1];
        if suppressing_comment(prev) {
            return true;
        }
        if whitespace_text(prev) && index > 1 && suppressing_comment(&siblings[index - 2]) {
            return true;
        }
    }
    false
}

fn suppressing_comment(node: &Node) -> bool {
    matches!(node, Node::Comment(c) if c.suppresses(RULE_NAME))
}

fn whitespace_text(node: &Node) -> bool {
    matches!(node, Node::Text(t) if t.is_whitespace())
}

fn finding_for(tag: &RawMustacheTag, filename: &str) -> Finding {
    let span = tag.expression.span();
    Finding {
        filename: filename.to_string(),
        start: span.start,
        end: span.end,
        message: WARNING_MESSAGE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse_template, Position, RawMustacheTag, Span};

    fn detect_in(source: &str, ignore_functions: &[&str]) -> Vec<Finding> {
        let root = parse_template(source, false).expect("template should parse");
        let ignore: Vec<String> = ignore_functions.iter().map(|s| s.to_string()).collect();
        detect(&root, "App.svelte", &ignore)
    }

    #[test]
    fn test_bare_identifier_is_flagged() {
        let warnings = detect_in("<div>{@html userInput}</div>", &[]);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].message, WARNING_MESSAGE);
        assert_eq!(warnings[0].start, Position { line: 1, column: 12 });
        assert_eq!(warnings[0].end, Position { line: 1, column: 21 });
    }

    #[test]
    fn test_allow_listed_sanitizer_suppresses() {
        let warnings = detect_in("<div>{@html sanitize(userInput)}</div>", &["sanitize"]);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_unknown_function_is_still_flagged() {
        let warnings = detect_in("<div>{@html format(userInput)}</div>", &["sanitize"]);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_member_call_is_not_trusted() {
        // DOMPurify.sanitize has no plain callee name, so the allow-list
        // entry "sanitize" must not match it.
        let warnings = detect_in(
            "<div>{@html DOMPurify.sanitize(userInput)}</div>",
            &["sanitize"],
        );
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_comment_immediately_after_suppresses() {
        let warnings =
            detect_in("<div>{@html x}<!-- svelte-ignore unsafe_html --></div>", &[]);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_comment_after_whitespace_suppresses() {
        let warnings =
            detect_in("<div>{@html x} <!-- svelte-ignore unsafe_html --></div>", &[]);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_comment_on_line_above_suppresses() {
        let warnings = detect_in("<!-- svelte-ignore unsafe_html -->\n{@html x}\n", &[]);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_unrelated_comment_does_not_suppress() {
        let warnings = detect_in("<!-- svelte-ignore a11y-autofocus -->\n{@html x}\n", &[]);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_distant_comment_does_not_suppress() {
        // A non-whitespace sibling between the comment and the insertion
        // breaks adjacency.
        let warnings =
            detect_in("<!-- svelte-ignore unsafe_html -->\n<br>\n{@html x}\n", &[]);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_nested_insertion_is_found() {
        let source = "<section>\n  <div>\n    {#if show}\n      <span>{@html markup}</span>\n    {/if}\n  </div>\n</section>\n";
        let warnings = detect_in(source, &[]);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].start, Position { line: 4, column: 19 });
        assert_eq!(warnings[0].end, Position { line: 4, column: 25 });
    }

    #[test]
    fn test_findings_follow_source_order() {
        let source = "{@html first}\n<div>{@html second}</div>\n{@html third}\n";
        let warnings = detect_in(source, &[]);
        let lines: Vec<_> = warnings.iter().map(|w| w.start.line).collect();
        assert_eq!(lines, vec![1, 2, 3]);
    }

    #[test]
    fn test_suppression_is_per_insertion() {
        let source = "<!-- svelte-ignore unsafe_html -->\n{@html a}\n<p>gap</p>\n{@html b}\n";
        let warnings = detect_in(source, &[]);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].start.line, 4);
    }

    #[test]
    fn test_bare_root_insertion() {
        let span = Span {
            start: Position { line: 1, column: 7 },
            end: Position { line: 1, column: 16 },
        };
        let root = Node::RawMustache(RawMustacheTag {
            expression: Expression::Identifier {
                name: "userInput".to_string(),
                span,
            },
            span,
        });
        let warnings = detect(&root, "App.svelte", &[]);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].start, span.start);
    }

    #[test]
    fn test_bare_root_sanitized_call() {
        let span = Span {
            start: Position { line: 1, column: 7 },
            end: Position { line: 1, column: 26 },
        };
        let root = Node::RawMustache(RawMustacheTag {
            expression: Expression::Call {
                callee: Some("sanitize".to_string()),
                span,
            },
            span,
        });
        let warnings = detect(&root, "App.svelte", &["sanitize".to_string()]);
        assert!(warnings.is_empty());
    }
}
